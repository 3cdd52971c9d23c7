//! ECS Components для агентов арены
//!
//! - actor: базовые характеристики (faction, health, body, facing, target)
//!
//! Компоненты подсистем (engagement, steering, sweep) живут рядом со своей логикой
//! в `ai`, `movement`, `combat`.

pub mod actor;

pub use actor::*;
