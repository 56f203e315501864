//! Table-driven flag rules
//!
//! A rule matches when every bit of `own_all` is present in the own mask,
//! no bit of `own_none` is, every bit of `parent_all` is present in the
//! ancestor mask and no bit of `current_none` is present in the full mask.
//! [`RuleEntry::FirstOf`] groups mutually exclusive rules; only the first
//! match of a group fires. Tables are evaluated top to bottom.

use redecl_reflect::{ClassFlags, EnumFlags, FlagSet, FunctionFlags, PropertyFlags, StructFlags};

use super::builder::FlagFormatter;
use crate::error::CodegenResult;

/// What a matching rule contributes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emit {
    Switch(&'static str),
    Parameter(&'static str, &'static str),
    MetaSwitch(&'static str),
    MetaParameter(&'static str, &'static str),
}

impl Emit {
    pub fn apply(&self, out: &mut FlagFormatter) -> CodegenResult<()> {
        match *self {
            Emit::Switch(name) => out.add_switch(name),
            Emit::Parameter(key, value) => out.add_parameter(key, value)?,
            Emit::MetaSwitch(name) => out.meta().add_switch(name),
            Emit::MetaParameter(key, value) => out.meta().add_parameter(key, value)?,
        }
        Ok(())
    }
}

/// One (bits → argument) rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagRule {
    pub own_all: u64,
    pub own_none: u64,
    pub parent_all: u64,
    pub current_none: u64,
    pub emit: Emit,
}

impl FlagRule {
    /// Match when all of `bits` are in the own mask
    pub const fn when(bits: u64, emit: Emit) -> Self {
        Self {
            own_all: bits,
            own_none: 0,
            parent_all: 0,
            current_none: 0,
            emit,
        }
    }

    /// Additionally require `bits` absent from the own mask
    pub const fn unless(mut self, bits: u64) -> Self {
        self.own_none |= bits;
        self
    }

    /// Additionally require `bits` on the ancestor
    pub const fn parent_has(mut self, bits: u64) -> Self {
        self.parent_all |= bits;
        self
    }

    /// Additionally require `bits` absent from the full mask
    pub const fn current_lacks(mut self, bits: u64) -> Self {
        self.current_none |= bits;
        self
    }

    pub fn matches(&self, input: &FlagInput) -> bool {
        input.own & self.own_all == self.own_all
            && input.own & self.own_none == 0
            && input.parent & self.parent_all == self.parent_all
            && input.current & self.current_none == 0
    }
}

/// Table entry
#[derive(Debug, Clone, Copy)]
pub enum RuleEntry {
    Single(FlagRule),
    /// Mutually exclusive alternatives in priority order
    FirstOf(&'static [FlagRule]),
}

/// Flag masks a table is evaluated against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagInput {
    pub current: u64,
    pub parent: u64,
    pub own: u64,
}

impl FlagInput {
    /// Compute own bits from the full mask and the nearest ancestor's mask
    pub fn new<F: FlagSet>(current: F, parent: Option<F>) -> Self {
        let own = redecl_reflect::own_bits(current, parent);
        Self {
            current: current.raw(),
            parent: parent.map(FlagSet::raw).unwrap_or(0),
            own: own.raw(),
        }
    }
}

/// Evaluate `table` against `input`, adding every match to `out`
pub fn evaluate(table: &[RuleEntry], input: &FlagInput, out: &mut FlagFormatter) -> CodegenResult<()> {
    for entry in table {
        match entry {
            RuleEntry::Single(rule) => {
                if rule.matches(input) {
                    rule.emit.apply(out)?;
                }
            }
            RuleEntry::FirstOf(group) => {
                if let Some(rule) = group.iter().find(|rule| rule.matches(input)) {
                    rule.emit.apply(out)?;
                }
            }
        }
    }
    Ok(())
}

// ── Tables ──────────────────────────────────────────────────────────

const fn c(flag: ClassFlags) -> u64 {
    flag.bits() as u64
}

const fn s(flag: StructFlags) -> u64 {
    flag.bits() as u64
}

const fn p(flag: PropertyFlags) -> u64 {
    flag.bits()
}

const fn f(flag: FunctionFlags) -> u64 {
    flag.bits() as u64
}

use Emit::{MetaParameter, Switch};
use RuleEntry::{FirstOf, Single};

pub const CLASS_RULES: &[RuleEntry] = &[
    Single(FlagRule::when(c(ClassFlags::MINIMAL_API), Switch("MinimalAPI"))),
    Single(FlagRule::when(c(ClassFlags::DEPRECATED), Switch("Deprecated"))),
    Single(FlagRule::when(c(ClassFlags::ABSTRACT), Switch("Abstract"))),
    Single(FlagRule::when(c(ClassFlags::NO_EXPORT), Switch("NoExport"))),
    Single(FlagRule::when(c(ClassFlags::CONST), Switch("Const"))),
    Single(FlagRule::when(c(ClassFlags::DEFAULT_TO_INSTANCED), Switch("DefaultToInstanced"))),
    FirstOf(&[
        FlagRule::when(c(ClassFlags::TRANSIENT), Switch("Transient")),
        FlagRule::when(0, Switch("NonTransient"))
            .parent_has(c(ClassFlags::TRANSIENT))
            .current_lacks(c(ClassFlags::TRANSIENT)),
    ]),
    FirstOf(&[
        FlagRule::when(c(ClassFlags::EDIT_INLINE_NEW), Switch("EditInlineNew")),
        FlagRule::when(0, Switch("NotEditInlineNew"))
            .parent_has(c(ClassFlags::EDIT_INLINE_NEW))
            .current_lacks(c(ClassFlags::EDIT_INLINE_NEW)),
    ]),
    FirstOf(&[
        FlagRule::when(c(ClassFlags::NOT_PLACEABLE), Switch("NotPlaceable")),
        FlagRule::when(0, Switch("Placeable"))
            .parent_has(c(ClassFlags::NOT_PLACEABLE))
            .current_lacks(c(ClassFlags::NOT_PLACEABLE)),
    ]),
    Single(FlagRule::when(c(ClassFlags::DEFAULT_CONFIG), Switch("DefaultConfig"))),
    Single(FlagRule::when(c(ClassFlags::GLOBAL_USER_CONFIG), Switch("GlobalUserConfig"))),
    Single(FlagRule::when(c(ClassFlags::PROJECT_USER_CONFIG), Switch("ProjectUserConfig"))),
    Single(FlagRule::when(c(ClassFlags::PER_OBJECT_CONFIG), Switch("PerObjectConfig"))),
    Single(FlagRule::when(
        c(ClassFlags::CONFIG_DO_NOT_CHECK_DEFAULTS),
        Switch("ConfigDoNotCheckDefaults"),
    )),
    Single(FlagRule::when(c(ClassFlags::HIDE_DROP_DOWN), Switch("HideDropdown"))),
    FirstOf(&[
        FlagRule::when(c(ClassFlags::COLLAPSE_CATEGORIES), Switch("CollapseCategories")),
        FlagRule::when(0, Switch("DontCollapseCategories"))
            .parent_has(c(ClassFlags::COLLAPSE_CATEGORIES))
            .current_lacks(c(ClassFlags::COLLAPSE_CATEGORIES)),
    ]),
];

pub const INTERFACE_RULES: &[RuleEntry] = &[Single(FlagRule::when(
    c(ClassFlags::MINIMAL_API),
    Switch("MinimalAPI"),
))];

pub const STRUCT_RULES: &[RuleEntry] = &[
    Single(FlagRule::when(s(StructFlags::NO_EXPORT), Switch("NoExport"))),
    Single(FlagRule::when(s(StructFlags::ATOMIC), Switch("Atomic"))),
    Single(FlagRule::when(s(StructFlags::IMMUTABLE), Switch("Immutable"))),
];

pub const ENUM_RULES: &[RuleEntry] = &[Single(FlagRule::when(
    EnumFlags::FLAGS.bits() as u64,
    Switch("Flags"),
))];

const EDIT: u64 = p(PropertyFlags::EDIT);
const EDIT_CONST: u64 = p(PropertyFlags::EDIT_CONST);
const NO_TEMPLATE: u64 = p(PropertyFlags::DISABLE_EDIT_ON_TEMPLATE);
const NO_INSTANCE: u64 = p(PropertyFlags::DISABLE_EDIT_ON_INSTANCE);

/// Editor visibility: three bits collapse into one argument
pub const PROPERTY_EDIT_RULES: &[RuleEntry] = &[FirstOf(&[
    FlagRule::when(EDIT | EDIT_CONST | NO_TEMPLATE, Switch("VisibleInstanceOnly")),
    FlagRule::when(EDIT | EDIT_CONST | NO_INSTANCE, Switch("VisibleDefaultsOnly")),
    FlagRule::when(EDIT | EDIT_CONST, Switch("VisibleAnywhere")),
    FlagRule::when(EDIT | NO_TEMPLATE, Switch("EditInstanceOnly")),
    FlagRule::when(EDIT | NO_INSTANCE, Switch("EditDefaultsOnly")),
    FlagRule::when(EDIT, Switch("EditAnywhere")),
])];

/// Scripting read access
pub const PROPERTY_BLUEPRINT_RULES: &[RuleEntry] = &[
    FirstOf(&[
        FlagRule::when(
            p(PropertyFlags::BLUEPRINT_VISIBLE) | p(PropertyFlags::BLUEPRINT_READ_ONLY),
            Switch("BlueprintReadOnly"),
        ),
        FlagRule::when(p(PropertyFlags::BLUEPRINT_VISIBLE), Switch("BlueprintReadWrite")),
    ]),
    Single(FlagRule::when(
        p(PropertyFlags::BLUEPRINT_VISIBLE) | p(PropertyFlags::NATIVE_ACCESS_PRIVATE),
        MetaParameter("AllowPrivateAccess", "true"),
    )),
];

pub const PROPERTY_RULES: &[RuleEntry] = &[
    Single(FlagRule::when(p(PropertyFlags::NO_CLEAR), Switch("NoClear"))),
    Single(FlagRule::when(p(PropertyFlags::EDIT_FIXED_SIZE), Switch("EditFixedSize"))),
    Single(FlagRule::when(p(PropertyFlags::SIMPLE_DISPLAY), Switch("SimpleDisplay"))),
    Single(FlagRule::when(p(PropertyFlags::ADVANCED_DISPLAY), Switch("AdvancedDisplay"))),
    Single(FlagRule::when(p(PropertyFlags::BLUEPRINT_ASSIGNABLE), Switch("BlueprintAssignable"))),
    Single(FlagRule::when(p(PropertyFlags::BLUEPRINT_CALLABLE), Switch("BlueprintCallable"))),
    Single(FlagRule::when(
        p(PropertyFlags::BLUEPRINT_AUTHORITY_ONLY),
        Switch("BlueprintAuthorityOnly"),
    )),
    FirstOf(&[
        FlagRule::when(
            p(PropertyFlags::CONFIG) | p(PropertyFlags::GLOBAL_CONFIG),
            Switch("GlobalConfig"),
        ),
        FlagRule::when(p(PropertyFlags::CONFIG), Switch("Config")),
    ]),
    Single(FlagRule::when(p(PropertyFlags::REP_SKIP), Switch("NotReplicated"))),
    Single(FlagRule::when(
        p(PropertyFlags::ASSET_REGISTRY_SEARCHABLE),
        Switch("AssetRegistrySearchable"),
    )),
    Single(FlagRule::when(p(PropertyFlags::INTERP), Switch("Interp"))),
    Single(FlagRule::when(p(PropertyFlags::SAVE_GAME), Switch("SaveGame"))),
    Single(FlagRule::when(p(PropertyFlags::NON_TRANSACTIONAL), Switch("NonTransactional"))),
    Single(FlagRule::when(p(PropertyFlags::TRANSIENT), Switch("Transient"))),
    Single(FlagRule::when(p(PropertyFlags::DUPLICATE_TRANSIENT), Switch("DuplicateTransient"))),
    Single(FlagRule::when(p(PropertyFlags::TEXT_EXPORT_TRANSIENT), Switch("TextExportTransient"))),
    Single(FlagRule::when(
        p(PropertyFlags::NON_PIE_DUPLICATE_TRANSIENT),
        Switch("NonPIEDuplicateTransient"),
    )),
    Single(FlagRule::when(p(PropertyFlags::SKIP_SERIALIZATION), Switch("SkipSerialization"))),
];

/// `UPARAM(...)` arguments
pub const PARAMETER_RULES: &[RuleEntry] = &[
    Single(
        FlagRule::when(
            p(PropertyFlags::REFERENCE_PARM) | p(PropertyFlags::OUT_PARM),
            Switch("Ref"),
        )
        .unless(p(PropertyFlags::CONST_PARM)),
    ),
    Single(FlagRule::when(p(PropertyFlags::REP_SKIP), Switch("NotReplicated"))),
];

const NET: u64 = f(FunctionFlags::NET);

pub const FUNCTION_RULES: &[RuleEntry] = &[
    FirstOf(&[
        FlagRule::when(
            f(FunctionFlags::BLUEPRINT_EVENT) | f(FunctionFlags::NATIVE),
            Switch("BlueprintNativeEvent"),
        ),
        FlagRule::when(f(FunctionFlags::BLUEPRINT_EVENT), Switch("BlueprintImplementableEvent")),
    ]),
    FirstOf(&[
        FlagRule::when(NET | f(FunctionFlags::NET_SERVER), Switch("Server")),
        FlagRule::when(NET | f(FunctionFlags::NET_CLIENT), Switch("Client")),
        FlagRule::when(NET | f(FunctionFlags::NET_MULTICAST), Switch("NetMulticast")),
        FlagRule::when(NET | f(FunctionFlags::NET_REQUEST), Switch("ServiceRequest")),
        FlagRule::when(NET | f(FunctionFlags::NET_RESPONSE), Switch("ServiceResponse")),
    ]),
    FirstOf(&[
        FlagRule::when(NET | f(FunctionFlags::NET_RELIABLE), Switch("Reliable")),
        FlagRule::when(NET, Switch("Unreliable")),
    ]),
    Single(FlagRule::when(NET | f(FunctionFlags::NET_VALIDATE), Switch("WithValidation"))),
    Single(FlagRule::when(f(FunctionFlags::EXEC), Switch("Exec"))),
    Single(FlagRule::when(
        f(FunctionFlags::BLUEPRINT_AUTHORITY_ONLY),
        Switch("BlueprintAuthorityOnly"),
    )),
    Single(FlagRule::when(f(FunctionFlags::BLUEPRINT_COSMETIC), Switch("BlueprintCosmetic"))),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn render<F: FlagSet>(table: &[RuleEntry], current: F, parent: Option<F>) -> String {
        let mut out = FlagFormatter::new();
        evaluate(table, &FlagInput::new(current, parent), &mut out).unwrap();
        out.build()
    }

    #[test]
    fn test_edit_matrix_collapses_to_one_switch() {
        let flags = PropertyFlags::EDIT | PropertyFlags::EDIT_CONST | PropertyFlags::DISABLE_EDIT_ON_INSTANCE;
        assert_eq!(render(PROPERTY_EDIT_RULES, flags, None), "VisibleDefaultsOnly");
        assert_eq!(render(PROPERTY_EDIT_RULES, PropertyFlags::EDIT, None), "EditAnywhere");
        assert_eq!(render(PROPERTY_EDIT_RULES, PropertyFlags::NONE, None), "");
    }

    #[test]
    fn test_read_only_excludes_read_write() {
        let flags = PropertyFlags::BLUEPRINT_VISIBLE | PropertyFlags::BLUEPRINT_READ_ONLY;
        assert_eq!(render(PROPERTY_BLUEPRINT_RULES, flags, None), "BlueprintReadOnly");
        let private = PropertyFlags::BLUEPRINT_VISIBLE | PropertyFlags::NATIVE_ACCESS_PRIVATE;
        assert_eq!(
            render(PROPERTY_BLUEPRINT_RULES, private, None),
            "BlueprintReadWrite, meta=(AllowPrivateAccess=true)"
        );
    }

    #[test]
    fn test_inherited_class_bits_are_not_repeated() {
        let parent = ClassFlags::TRANSIENT | ClassFlags::CONFIG;
        let current = ClassFlags::TRANSIENT | ClassFlags::CONFIG | ClassFlags::ABSTRACT;
        assert_eq!(render(CLASS_RULES, current, Some(parent)), "Abstract");
    }

    #[test]
    fn test_non_transient_when_parent_transient() {
        let parent = ClassFlags::TRANSIENT;
        assert_eq!(render(CLASS_RULES, ClassFlags::NATIVE, Some(parent)), "NonTransient");
    }

    #[test]
    fn test_net_function_rules() {
        let flags = FunctionFlags::NET | FunctionFlags::NET_SERVER | FunctionFlags::NET_VALIDATE;
        assert_eq!(render(FUNCTION_RULES, flags, None), "Server, Unreliable, WithValidation");
        let reliable = FunctionFlags::NET | FunctionFlags::NET_CLIENT | FunctionFlags::NET_RELIABLE;
        assert_eq!(render(FUNCTION_RULES, reliable, None), "Client, Reliable");
    }

    #[test]
    fn test_const_ref_parameter_is_not_ref() {
        let out_ref = PropertyFlags::REFERENCE_PARM | PropertyFlags::OUT_PARM;
        assert_eq!(render(PARAMETER_RULES, out_ref, None), "Ref");
        assert_eq!(render(PARAMETER_RULES, out_ref | PropertyFlags::CONST_PARM, None), "");
    }
}
