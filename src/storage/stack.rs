//! A fixed-capacity LIFO stack.

/// A stack that refuses pushes once it holds `capacity` items.
///
/// The backing storage is allocated once, up front.
#[derive(Debug, Clone)]
pub struct BoundedStack<T> {
    items: Vec<T>,
    capacity: usize,
}

impl<T> BoundedStack<T> {
    /// Creates an empty stack that holds at most `capacity` items.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Pushes an item.
    ///
    /// # Errors
    ///
    /// Hands the item back if the stack is full. The stack is unchanged.
    pub fn push(&mut self, item: T) -> Result<(), T> {
        if self.items.len() >= self.capacity {
            return Err(item);
        }
        self.items.push(item);
        Ok(())
    }

    /// Removes and returns the top item.
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_reverse_push_order() {
        let mut stack = BoundedStack::with_capacity(3);
        stack.push(1).unwrap();
        stack.push(2).unwrap();
        stack.push(3).unwrap();

        assert_eq!(stack.pop(), Some(3));
        assert_eq!(stack.pop(), Some(2));
        assert_eq!(stack.pop(), Some(1));
        assert_eq!(stack.pop(), None);
    }

    #[test]
    fn overflow_returns_item_and_leaves_stack_intact() {
        let mut stack = BoundedStack::with_capacity(2);
        stack.push('a').unwrap();
        stack.push('b').unwrap();

        assert_eq!(stack.push('c'), Err('c'));
        assert_eq!(stack.pop(), Some('b'));
        assert_eq!(stack.pop(), Some('a'));
        assert_eq!(stack.pop(), None);
    }

    #[test]
    fn zero_capacity_rejects_everything() {
        let mut stack = BoundedStack::with_capacity(0);
        assert_eq!(stack.push(1), Err(1));
        assert_eq!(stack.pop(), None);
    }

    #[test]
    fn pop_makes_room_again() {
        let mut stack = BoundedStack::with_capacity(1);
        stack.push(1).unwrap();
        assert_eq!(stack.push(2), Err(2));
        stack.pop();
        assert!(stack.push(2).is_ok());
    }
}
