//! DeferredActions: отложенные действия с отменой
//!
//! Владелец (компонент агента) сам двигает время через `advance(dt)`,
//! поэтому после `cancel_all()` ни одно действие уже не сработает.
//! Никаких колбэков: `advance` просто возвращает созревшие действия.

use bevy::prelude::*;

/// Токен запланированного действия
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub struct TaskHandle(u64);

#[derive(Debug, Clone)]
struct Pending<A> {
    handle: TaskHandle,
    remaining: f32,
    action: A,
}

/// Очередь отложенных действий одного владельца
#[derive(Debug, Clone)]
pub struct DeferredActions<A> {
    next_id: u64,
    pending: Vec<Pending<A>>,
}

impl<A> Default for DeferredActions<A> {
    fn default() -> Self {
        Self {
            next_id: 0,
            pending: Vec::new(),
        }
    }
}

impl<A> DeferredActions<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Запланировать действие через `delay` секунд (отрицательное = на ближайшем advance)
    pub fn schedule(&mut self, delay: f32, action: A) -> TaskHandle {
        let handle = TaskHandle(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending {
            handle,
            remaining: if delay.is_finite() { delay.max(0.0) } else { 0.0 },
            action,
        });
        handle
    }

    /// Отменить одно действие. `false` если оно уже сработало или не существовало
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.handle != handle);
        self.pending.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.pending.iter().any(|p| p.handle == handle)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Продвинуть время. Возвращает созревшие действия в порядке срабатывания
    /// (раньше по времени, при равенстве: раньше запланированные).
    pub fn advance(&mut self, dt: f32) -> Vec<A> {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        let mut due: Vec<Pending<A>> = Vec::new();
        let mut index = 0;
        while index < self.pending.len() {
            self.pending[index].remaining -= dt;
            if self.pending[index].remaining <= 0.0 {
                due.push(self.pending.remove(index));
            } else {
                index += 1;
            }
        }

        due.sort_by(|a, b| {
            a.remaining
                .total_cmp(&b.remaining)
                .then(a.handle.0.cmp(&b.handle.0))
        });
        due.into_iter().map(|p| p.action).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_fires_after_delay() {
        let mut actions = DeferredActions::new();
        actions.schedule(0.15, "strike");

        assert!(actions.advance(0.1).is_empty());
        assert_eq!(actions.advance(0.1), vec!["strike"]);
        assert!(actions.is_empty());
    }

    #[test]
    fn test_cancelled_action_never_fires() {
        let mut actions = DeferredActions::new();
        let handle = actions.schedule(0.1, 1);

        assert!(actions.cancel(handle));
        assert!(!actions.cancel(handle));
        assert!(actions.advance(1.0).is_empty());
    }

    #[test]
    fn test_cancel_all() {
        let mut actions = DeferredActions::new();
        actions.schedule(0.1, 1);
        actions.schedule(0.2, 2);
        actions.cancel_all();

        assert!(!actions.has_pending());
        assert!(actions.advance(1.0).is_empty());
    }

    #[test]
    fn test_due_actions_ordered_by_time() {
        let mut actions = DeferredActions::new();
        actions.schedule(0.3, 'c');
        actions.schedule(0.1, 'a');
        actions.schedule(0.2, 'b');
        actions.schedule(0.1, 'd');

        // Большой шаг: все созрели, порядок по времени, потом по очереди
        assert_eq!(actions.advance(1.0), vec!['a', 'd', 'b', 'c']);
    }

    #[test]
    fn test_zero_delay_fires_on_next_advance() {
        let mut actions = DeferredActions::new();
        let handle = actions.schedule(0.0, ());
        assert!(actions.is_pending(handle));
        assert_eq!(actions.advance(0.0).len(), 1);
    }
}
