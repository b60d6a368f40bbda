pub const DEFAULT_STACK_CAPACITY: usize = 16;

/// Bounded LIFO of subroutine return addresses.
pub struct CallStack {
    frames: Vec<u16>,
    capacity: usize,
}

impl CallStack {
    pub fn new(capacity: usize) -> Self {
        Self {
            frames: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Pushes a return address, handing it back if the stack is full.
    pub fn push(&mut self, return_address: u16) -> Result<(), u16> {
        if self.frames.len() >= self.capacity {
            return Err(return_address);
        }

        self.frames.push(return_address);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<u16> {
        self.frames.pop()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Return addresses from the outermost call to the innermost.
    pub fn frames(&self) -> &[u16] {
        &self.frames
    }
}

impl Default for CallStack {
    fn default() -> Self {
        Self::new(DEFAULT_STACK_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_reverse_order() {
        let mut stack = CallStack::default();
        stack.push(0x202).unwrap();
        stack.push(0x304).unwrap();
        assert_eq!(stack.pop(), Some(0x304));
        assert_eq!(stack.pop(), Some(0x202));
        assert_eq!(stack.pop(), None);
    }

    #[test]
    fn push_past_capacity_is_refused() {
        let mut stack = CallStack::new(2);
        stack.push(1).unwrap();
        stack.push(2).unwrap();
        assert_eq!(stack.push(3), Err(3));
        assert_eq!(stack.frames(), &[1, 2]);
        assert_eq!(stack.capacity(), 2);
    }
}
