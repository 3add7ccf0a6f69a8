//! Host-supplied call data.

use crate::{Address, Height, ParentRef};

/// What the host tells a component about the call it is serving.
///
/// `caller` is authenticated by the host. `height` is the current value of
/// the host's monotonic height counter, `parent_ref` identifies the state the
/// call builds on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    pub caller: Address,
    pub height: Height,
    pub parent_ref: ParentRef,
}

impl CallContext {
    /// Context for a call by `caller` at `height`.
    pub const fn new(caller: Address, height: Height, parent_ref: ParentRef) -> Self {
        Self {
            caller,
            height,
            parent_ref,
        }
    }

    /// Context of a nested call made by component `component` while serving
    /// this one. Height and parent stay the same.
    #[must_use]
    pub const fn forwarded_by(&self, component: Address) -> Self {
        Self {
            caller: component,
            height: self.height,
            parent_ref: self.parent_ref,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forwarding_swaps_caller_only() {
        let ctx = CallContext::new(Address::from_low_u64(1), Height(10), ParentRef([7; 32]));
        let nested = ctx.forwarded_by(Address::from_low_u64(2));
        assert_eq!(nested.caller, Address::from_low_u64(2));
        assert_eq!(nested.height, ctx.height);
        assert_eq!(nested.parent_ref, ctx.parent_ref);
    }
}
