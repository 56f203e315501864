//! Member access levels

use redecl_reflect::{FunctionFlags, PropertyFlags};

use crate::file::SourceFile;

/// Native access specifier of a member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessLevel {
    Public,
    Protected,
    Private,
}

impl AccessLevel {
    pub fn label(self) -> &'static str {
        match self {
            AccessLevel::Public => "public:",
            AccessLevel::Protected => "protected:",
            AccessLevel::Private => "private:",
        }
    }

    /// Access of a field; `None` when no access bit is set
    pub fn of_field(flags: PropertyFlags) -> Option<Self> {
        if flags.contains(PropertyFlags::NATIVE_ACCESS_PUBLIC) {
            Some(AccessLevel::Public)
        } else if flags.contains(PropertyFlags::NATIVE_ACCESS_PROTECTED) {
            Some(AccessLevel::Protected)
        } else if flags.contains(PropertyFlags::NATIVE_ACCESS_PRIVATE) {
            Some(AccessLevel::Private)
        } else {
            None
        }
    }

    /// Access of a method; `None` when no access bit is set
    pub fn of_function(flags: FunctionFlags) -> Option<Self> {
        if flags.contains(FunctionFlags::PRIVATE) {
            Some(AccessLevel::Private)
        } else if flags.contains(FunctionFlags::PROTECTED) {
            Some(AccessLevel::Protected)
        } else if flags.contains(FunctionFlags::PUBLIC) {
            Some(AccessLevel::Public)
        } else {
            None
        }
    }
}

/// Access level currently in effect while members are emitted
#[derive(Debug, Default, Clone, Copy)]
pub struct AccessCursor {
    current: Option<AccessLevel>,
}

impl AccessCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<AccessLevel> {
        self.current
    }

    /// Move to `needed`, returning the marker line if the level changed
    pub fn transition(&mut self, needed: AccessLevel) -> Option<&'static str> {
        if self.current == Some(needed) {
            return None;
        }
        self.current = Some(needed);
        Some(needed.label())
    }

    /// Move to `needed`, writing the marker into `file` if the level changed
    pub fn enter(&mut self, needed: AccessLevel, file: &mut SourceFile) {
        if let Some(label) = self.transition(needed) {
            file.append_line_no_indent(label);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_only_on_change() {
        let mut cursor = AccessCursor::new();
        assert_eq!(cursor.transition(AccessLevel::Public), Some("public:"));
        assert_eq!(cursor.transition(AccessLevel::Public), None);
        assert_eq!(cursor.transition(AccessLevel::Private), Some("private:"));
        assert_eq!(cursor.transition(AccessLevel::Public), Some("public:"));
    }

    #[test]
    fn test_field_access_bits() {
        assert_eq!(
            AccessLevel::of_field(PropertyFlags::NATIVE_ACCESS_PROTECTED),
            Some(AccessLevel::Protected)
        );
        assert_eq!(AccessLevel::of_field(PropertyFlags::EDIT), None);
    }

    #[test]
    fn test_function_private_wins() {
        let flags = FunctionFlags::PUBLIC | FunctionFlags::PRIVATE;
        assert_eq!(AccessLevel::of_function(flags), Some(AccessLevel::Private));
        assert_eq!(AccessLevel::of_function(FunctionFlags::NATIVE), None);
    }
}
