//! Reflection flag bitmasks
//!
//! Each descriptor kind carries one flat bitmask. The bit values follow the
//! host object system's layout so snapshots can carry the raw numbers
//! unchanged. Masks that can be implied by inheritance expose an `INHERIT`
//! constant; see [`own_bits`] for how the generator strips them.

use serde::{Deserialize, Serialize};

/// Common access to the raw bits of a flag newtype.
pub trait FlagSet: Copy {
    /// Raw bits widened to 64 bits.
    fn raw(self) -> u64;

    /// Rebuild from 64 bits, truncating to the native width.
    fn from_raw(bits: u64) -> Self;

    /// Bits that a descendant receives from its ancestor automatically.
    fn inherit_mask() -> u64 {
        0
    }
}

/// Strip every inheritable bit the ancestor already guarantees.
///
/// `own = current & !(parent & INHERIT)`
pub fn own_bits<F: FlagSet>(current: F, parent: Option<F>) -> F {
    let parent = parent.map(FlagSet::raw).unwrap_or(0);
    F::from_raw(current.raw() & !(parent & F::inherit_mask()))
}

/// Inverse of [`own_bits`]: put the ancestor's inheritable bits back.
pub fn merge_inherited<F: FlagSet>(own: F, parent: Option<F>) -> F {
    let parent = parent.map(FlagSet::raw).unwrap_or(0);
    F::from_raw(own.raw() | (parent & F::inherit_mask()))
}

macro_rules! bitmask {
    (
        $(#[$meta:meta])*
        $name:ident($repr:ty), inherit = $inherit:expr;
        $( $(#[$cmeta:meta])* $flag:ident = $value:expr; )*
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name($repr);

        impl $name {
            /// No flags set
            pub const NONE: Self = Self(0);
            $( $(#[$cmeta])* pub const $flag: Self = Self($value); )*

            /// Create from raw bits
            pub const fn from_bits(bits: $repr) -> Self {
                Self(bits)
            }

            /// Get raw bits
            pub const fn bits(&self) -> $repr {
                self.0
            }

            /// Check that every bit of `other` is set
            pub const fn contains(&self, other: Self) -> bool {
                (self.0 & other.0) == other.0
            }

            /// Check that at least one bit of `other` is set
            pub const fn intersects(&self, other: Self) -> bool {
                (self.0 & other.0) != 0
            }

            /// Union of flags
            pub const fn union(&self, other: Self) -> Self {
                Self(self.0 | other.0)
            }

            /// Intersection of flags
            pub const fn intersection(&self, other: Self) -> Self {
                Self(self.0 & other.0)
            }

            /// Difference (remove flags)
            pub const fn difference(&self, other: Self) -> Self {
                Self(self.0 & !other.0)
            }

            pub const fn is_empty(&self) -> bool {
                self.0 == 0
            }
        }

        impl FlagSet for $name {
            fn raw(self) -> u64 {
                self.0 as u64
            }

            fn from_raw(bits: u64) -> Self {
                Self(bits as $repr)
            }

            fn inherit_mask() -> u64 {
                ($inherit).0 as u64
            }
        }

        impl std::ops::BitOr for $name {
            type Output = Self;

            fn bitor(self, rhs: Self) -> Self {
                self.union(rhs)
            }
        }

        impl std::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "0x{:X}", self.0)
            }
        }
    };
}

bitmask! {
    /// Class-level flags
    ClassFlags(u32), inherit = ClassFlags::INHERIT;
    ABSTRACT = 0x0000_0001;
    DEFAULT_CONFIG = 0x0000_0002;
    CONFIG = 0x0000_0004;
    TRANSIENT = 0x0000_0008;
    PROJECT_USER_CONFIG = 0x0000_0040;
    /// Backed by native code
    NATIVE = 0x0000_0080;
    NO_EXPORT = 0x0000_0100;
    NOT_PLACEABLE = 0x0000_0200;
    PER_OBJECT_CONFIG = 0x0000_0400;
    EDIT_INLINE_NEW = 0x0000_1000;
    COLLAPSE_CATEGORIES = 0x0000_2000;
    INTERFACE = 0x0000_4000;
    CONST = 0x0001_0000;
    MINIMAL_API = 0x0008_0000;
    /// Exported from its module
    REQUIRED_API = 0x0010_0000;
    DEFAULT_TO_INSTANCED = 0x0020_0000;
    HAS_INSTANCED_REFERENCE = 0x0080_0000;
    HIDDEN = 0x0100_0000;
    DEPRECATED = 0x0200_0000;
    HIDE_DROP_DOWN = 0x0400_0000;
    GLOBAL_USER_CONFIG = 0x0800_0000;
    INTRINSIC = 0x1000_0000;
    CONFIG_DO_NOT_CHECK_DEFAULTS = 0x4000_0000;
    /// Bits a subclass receives from its super class
    INHERIT = 0x0000_0008 | 0x0000_0002 | 0x0000_0004 | 0x0000_0400
        | 0x4000_0000 | 0x0000_0200 | 0x0001_0000 | 0x0080_0000
        | 0x0200_0000 | 0x0020_0000 | 0x0800_0000 | 0x0000_0040;
}

bitmask! {
    /// Value-aggregate flags
    StructFlags(u32), inherit = StructFlags::INHERIT;
    NATIVE = 0x0000_0001;
    IDENTICAL_NATIVE = 0x0000_0002;
    HAS_INSTANCED_REFERENCE = 0x0000_0004;
    NO_EXPORT = 0x0000_0008;
    ATOMIC = 0x0000_0010;
    IMMUTABLE = 0x0000_0020;
    ADD_STRUCT_REFERENCED_OBJECTS = 0x0000_0040;
    REQUIRED_API = 0x0000_0200;
    NET_SERIALIZE_NATIVE = 0x0000_0400;
    SERIALIZE_NATIVE = 0x0000_0800;
    COPY_NATIVE = 0x0000_1000;
    IS_PLAIN_OLD_DATA = 0x0000_2000;
    NO_DESTRUCTOR = 0x0000_4000;
    ZERO_CONSTRUCTOR = 0x0000_8000;
    EXPORT_TEXT_ITEM_NATIVE = 0x0001_0000;
    IMPORT_TEXT_ITEM_NATIVE = 0x0002_0000;
    POST_SERIALIZE_NATIVE = 0x0004_0000;
    SERIALIZE_FROM_MISMATCHED_TAG = 0x0008_0000;
    NET_DELTA_SERIALIZE_NATIVE = 0x0010_0000;
    POST_SCRIPT_CONSTRUCT = 0x0020_0000;
    NET_SHARED_SERIALIZATION = 0x0040_0000;
    /// Bits a derived aggregate receives from its super aggregate
    INHERIT = 0x0000_0004 | 0x0000_0010;
    /// Bits the object system derives from native traits rather than source
    COMPUTED = 0x0010_0000 | 0x0000_0400 | 0x0000_0800 | 0x0004_0000
        | 0x0000_1000 | 0x0000_2000 | 0x0000_4000 | 0x0000_8000
        | 0x0000_0002 | 0x0000_0040 | 0x0001_0000 | 0x0002_0000
        | 0x0008_0000 | 0x0020_0000 | 0x0040_0000;
}

bitmask! {
    /// Field and parameter flags
    PropertyFlags(u64), inherit = PropertyFlags::NONE;
    EDIT = 0x0000_0000_0000_0001;
    CONST_PARM = 0x0000_0000_0000_0002;
    BLUEPRINT_VISIBLE = 0x0000_0000_0000_0004;
    EXPORT_OBJECT = 0x0000_0000_0000_0008;
    BLUEPRINT_READ_ONLY = 0x0000_0000_0000_0010;
    /// Replicated over the network
    NET = 0x0000_0000_0000_0020;
    EDIT_FIXED_SIZE = 0x0000_0000_0000_0040;
    PARM = 0x0000_0000_0000_0080;
    OUT_PARM = 0x0000_0000_0000_0100;
    ZERO_CONSTRUCTOR = 0x0000_0000_0000_0200;
    RETURN_PARM = 0x0000_0000_0000_0400;
    DISABLE_EDIT_ON_TEMPLATE = 0x0000_0000_0000_0800;
    TRANSIENT = 0x0000_0000_0000_2000;
    CONFIG = 0x0000_0000_0000_4000;
    DISABLE_EDIT_ON_INSTANCE = 0x0000_0000_0001_0000;
    EDIT_CONST = 0x0000_0000_0002_0000;
    GLOBAL_CONFIG = 0x0000_0000_0004_0000;
    INSTANCED_REFERENCE = 0x0000_0000_0008_0000;
    DUPLICATE_TRANSIENT = 0x0000_0000_0020_0000;
    SAVE_GAME = 0x0000_0000_0100_0000;
    NO_CLEAR = 0x0000_0000_0200_0000;
    REFERENCE_PARM = 0x0000_0000_0800_0000;
    BLUEPRINT_ASSIGNABLE = 0x0000_0000_1000_0000;
    DEPRECATED = 0x0000_0000_2000_0000;
    IS_PLAIN_OLD_DATA = 0x0000_0000_4000_0000;
    REP_SKIP = 0x0000_0000_8000_0000;
    REP_NOTIFY = 0x0000_0001_0000_0000;
    INTERP = 0x0000_0002_0000_0000;
    NON_TRANSACTIONAL = 0x0000_0004_0000_0000;
    EDITOR_ONLY = 0x0000_0008_0000_0000;
    NO_DESTRUCTOR = 0x0000_0010_0000_0000;
    AUTO_WEAK = 0x0000_0040_0000_0000;
    CONTAINS_INSTANCED_REFERENCE = 0x0000_0080_0000_0000;
    ASSET_REGISTRY_SEARCHABLE = 0x0000_0100_0000_0000;
    SIMPLE_DISPLAY = 0x0000_0200_0000_0000;
    ADVANCED_DISPLAY = 0x0000_0400_0000_0000;
    PROTECTED = 0x0000_0800_0000_0000;
    BLUEPRINT_CALLABLE = 0x0000_1000_0000_0000;
    BLUEPRINT_AUTHORITY_ONLY = 0x0000_2000_0000_0000;
    TEXT_EXPORT_TRANSIENT = 0x0000_4000_0000_0000;
    NON_PIE_DUPLICATE_TRANSIENT = 0x0000_8000_0000_0000;
    EXPOSE_ON_SPAWN = 0x0001_0000_0000_0000;
    PERSISTENT_INSTANCE = 0x0002_0000_0000_0000;
    UOBJECT_WRAPPER = 0x0004_0000_0000_0000;
    HAS_GET_VALUE_TYPE_HASH = 0x0008_0000_0000_0000;
    NATIVE_ACCESS_PUBLIC = 0x0010_0000_0000_0000;
    NATIVE_ACCESS_PROTECTED = 0x0020_0000_0000_0000;
    NATIVE_ACCESS_PRIVATE = 0x0040_0000_0000_0000;
    SKIP_SERIALIZATION = 0x0080_0000_0000_0000;
}

bitmask! {
    /// Method and delegate-signature flags
    FunctionFlags(u32), inherit = FunctionFlags::INHERIT;
    FINAL = 0x0000_0001;
    REQUIRED_API = 0x0000_0002;
    BLUEPRINT_AUTHORITY_ONLY = 0x0000_0004;
    BLUEPRINT_COSMETIC = 0x0000_0008;
    /// Network-dispatched
    NET = 0x0000_0040;
    NET_RELIABLE = 0x0000_0080;
    NET_REQUEST = 0x0000_0100;
    EXEC = 0x0000_0200;
    NATIVE = 0x0000_0400;
    EVENT = 0x0000_0800;
    NET_RESPONSE = 0x0000_1000;
    STATIC = 0x0000_2000;
    NET_MULTICAST = 0x0000_4000;
    UBERGRAPH_FUNCTION = 0x0000_8000;
    MULTICAST_DELEGATE = 0x0001_0000;
    PUBLIC = 0x0002_0000;
    PRIVATE = 0x0004_0000;
    PROTECTED = 0x0008_0000;
    /// Marks a delegate signature
    DELEGATE = 0x0010_0000;
    NET_SERVER = 0x0020_0000;
    HAS_OUT_PARMS = 0x0040_0000;
    HAS_DEFAULTS = 0x0080_0000;
    NET_CLIENT = 0x0100_0000;
    DLL_IMPORT = 0x0200_0000;
    BLUEPRINT_CALLABLE = 0x0400_0000;
    BLUEPRINT_EVENT = 0x0800_0000;
    BLUEPRINT_PURE = 0x1000_0000;
    EDITOR_ONLY = 0x2000_0000;
    CONST = 0x4000_0000;
    NET_VALIDATE = 0x8000_0000;
    /// Bits an overriding method receives from the method it overrides
    INHERIT = 0x0000_0200 | 0x0000_0800 | 0x0400_0000 | 0x0800_0000
        | 0x0000_0004 | 0x0000_0008 | 0x4000_0000;
}

bitmask! {
    /// Enumeration flags
    EnumFlags(u32), inherit = EnumFlags::NONE;
    /// Entries are combinable bit flags
    FLAGS = 0x0000_0001;
    NEWER_VERSION_EXISTS = 0x0000_0002;
}

bitmask! {
    /// Per-object lifecycle flags
    ObjectFlags(u32), inherit = ObjectFlags::NONE;
    PUBLIC = 0x0000_0001;
    STANDALONE = 0x0000_0002;
    MARK_AS_NATIVE = 0x0000_0004;
    TRANSACTIONAL = 0x0000_0008;
    CLASS_DEFAULT_OBJECT = 0x0000_0010;
    ARCHETYPE_OBJECT = 0x0000_0020;
    TRANSIENT = 0x0000_0040;
    /// Owned sub-object created by its outer's constructor
    DEFAULT_SUB_OBJECT = 0x0004_0000;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_own_bits_strips_inherited() {
        let parent = ClassFlags::TRANSIENT | ClassFlags::ABSTRACT;
        let current = ClassFlags::TRANSIENT | ClassFlags::ABSTRACT | ClassFlags::NATIVE;
        let own = own_bits(current, Some(parent));
        // ABSTRACT is not inheritable, so it stays
        assert_eq!(own, ClassFlags::ABSTRACT | ClassFlags::NATIVE);
    }

    #[test]
    fn test_own_bits_without_parent() {
        let current = ClassFlags::TRANSIENT | ClassFlags::CONFIG;
        assert_eq!(own_bits(current, None), current);
    }

    #[test]
    fn test_merge_inherited_round_trip() {
        let parent = StructFlags::ATOMIC;
        let current = StructFlags::ATOMIC | StructFlags::NATIVE;
        let own = own_bits(current, Some(parent));
        assert_eq!(own, StructFlags::NATIVE);
        assert_eq!(merge_inherited(own, Some(parent)), current);
    }

    #[test]
    fn test_property_flags_serde_transparent() {
        let flags = PropertyFlags::NET | PropertyFlags::EDIT;
        let json = serde_json::to_string(&flags).unwrap();
        assert_eq!(json, "33");
        let back: PropertyFlags = serde_json::from_str(&json).unwrap();
        assert_eq!(back, flags);
    }

    #[test]
    fn test_contains_and_intersects() {
        let flags = FunctionFlags::NET | FunctionFlags::NET_RELIABLE;
        assert!(flags.contains(FunctionFlags::NET));
        assert!(!flags.contains(FunctionFlags::NET | FunctionFlags::STATIC));
        assert!(flags.intersects(FunctionFlags::NET | FunctionFlags::STATIC));
        assert_eq!(flags.difference(FunctionFlags::NET), FunctionFlags::NET_RELIABLE);
    }
}
