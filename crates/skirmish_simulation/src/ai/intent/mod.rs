//! Intent: профиль поведения агента и его применение к контроллерам
//!
//! - profile: IntentProfile + IntentModifier (pure reducer с клампами)
//! - presets: каталог архетипов/трейтов, roll_build
//! - applicator: IntentApplicator (профиль → тюнинг, по интервалу)

pub mod applicator;
pub mod presets;
pub mod profile;

pub use applicator::{melee_tuning_for, ranged_tuning_for, IntentApplicator, DEFAULT_APPLY_INTERVAL};
pub use presets::{roll_build, TraitBuild, TraitCatalog};
pub use profile::{bounds, IntentModifier, IntentProfile};
