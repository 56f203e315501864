//! Annotation argument lists
//!
//! Table rules cover the bit-for-bit cases; everything here adds the
//! contextual arguments that depend on the super chain, on recorded type
//! usage or on the generator switches.

use redecl_reflect::{
    ClassDescriptor, ClassRefKind, EnumDescriptor, EnumForm, FieldDescriptor, FieldKind, FunctionFlags,
    MethodDescriptor, ObjectId, ObjectRefKind, PropertyFlags, ReflectedObject, StructDescriptor, StructFlags,
};

use super::Synthesizer;
use crate::context::TypeUsage;
use crate::error::CodegenResult;
use crate::flags::rules::{
    CLASS_RULES, ENUM_RULES, FUNCTION_RULES, INTERFACE_RULES, PARAMETER_RULES, PROPERTY_BLUEPRINT_RULES,
    PROPERTY_EDIT_RULES, PROPERTY_RULES, STRUCT_RULES,
};
use crate::flags::{evaluate, FlagFormatter, FlagInput};
use crate::names::{CORE_UOBJECT_PACKAGE, ENGINE_PACKAGE};
use crate::types::is_root_object;

/// Classes that are scriptable themselves without passing it on
const INTRINSIC_ROOTS: &[(&str, &str)] = &[
    (CORE_UOBJECT_PACKAGE, "Object"),
    (ENGINE_PACKAGE, "ActorComponent"),
    (ENGINE_PACKAGE, "SceneComponent"),
];

/// Config category that means "no config file"
const NO_CONFIG: &str = "None";

/// Scripting exposure implied by a class's members
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlueprintInfo {
    pub blueprintable: bool,
    pub blueprint_type: bool,
}

impl Synthesizer<'_> {
    /// Exposure accumulated from the root of the super chain down to `id`
    pub(super) fn blueprint_info(&self, id: ObjectId) -> BlueprintInfo {
        let mut info = BlueprintInfo::default();
        for ancestor in self.graph.super_chain(id).into_iter().rev() {
            let Some(object) = self.graph.object(ancestor) else {
                continue;
            };
            let intrinsic = INTRINSIC_ROOTS
                .iter()
                .any(|(package, name)| object.package == *package && object.name == *name);
            if intrinsic {
                info = BlueprintInfo::default();
                continue;
            }
            let Some(class) = object.as_class() else {
                continue;
            };

            if class
                .fields
                .iter()
                .any(|f| f.flags.contains(PropertyFlags::BLUEPRINT_VISIBLE))
            {
                info.blueprint_type = true;
            }
            for function in &class.functions {
                let Some(method) = self.graph.object(*function).and_then(ReflectedObject::as_function) else {
                    continue;
                };
                if method.flags.contains(FunctionFlags::BLUEPRINT_EVENT) {
                    info.blueprintable = true;
                    info.blueprint_type = true;
                    break;
                }
                if method.flags.contains(FunctionFlags::BLUEPRINT_CALLABLE) {
                    info.blueprint_type = true;
                }
            }
        }
        info
    }

    /// Whether the aggregate or one of its parents has a scripting-visible field
    pub(super) fn is_struct_blueprint_type(&self, id: ObjectId) -> bool {
        self.graph.super_chain(id).into_iter().any(|ancestor| {
            self.graph
                .object(ancestor)
                .map(|o| {
                    o.fields()
                        .iter()
                        .any(|f| f.flags.contains(PropertyFlags::BLUEPRINT_VISIBLE))
                })
                .unwrap_or(false)
        })
    }

    pub(super) fn class_annotations(&self, id: ObjectId, class: &ClassDescriptor) -> CodegenResult<String> {
        let parent = class
            .super_class
            .and_then(|s| self.graph.object(s))
            .and_then(ReflectedObject::as_class);
        let input = FlagInput::new(class.flags, parent.map(|p| p.flags));
        let mut out = FlagFormatter::new();

        if self.config.generator.make_all_properties_blueprint_read_write {
            out.add_switch("Blueprintable");
        } else {
            let info = self.blueprint_info(id);
            let parent_info = class
                .super_class
                .map(|s| self.blueprint_info(s))
                .unwrap_or_default();
            if info.blueprintable {
                if !parent_info.blueprintable {
                    out.add_switch("Blueprintable");
                }
            } else if info.blueprint_type && !parent_info.blueprint_type {
                out.add_switch("BlueprintType");
            }
        }

        evaluate(CLASS_RULES, &input, &mut out)?;

        if let Some(within) = class.within {
            let parent_within = parent.and_then(|p| p.within);
            if !is_root_object(self.graph, within) && parent_within != Some(within) {
                out.add_parameter("Within", self.graph.get(within)?.name.clone())?;
            }
        }

        let config_name = class.config_name.as_str();
        let parent_config = parent.map(|p| p.config_name.as_str());
        if !config_name.is_empty() && config_name != NO_CONFIG && parent_config != Some(config_name) {
            out.add_parameter("Config", config_name)?;
        }

        if self.graph.is_child_of(id, ENGINE_PACKAGE, "ActorComponent") {
            out.meta().add_switch("BlueprintSpawnableComponent");
            out.add_parameter("ClassGroup", "Custom")?;
        }

        Ok(out.build())
    }

    pub(super) fn interface_annotations(&self, id: ObjectId, class: &ClassDescriptor) -> CodegenResult<String> {
        let parent = class
            .super_class
            .and_then(|s| self.graph.object(s))
            .and_then(ReflectedObject::as_class);
        let input = FlagInput::new(class.flags, parent.map(|p| p.flags));
        let mut out = FlagFormatter::new();
        evaluate(INTERFACE_RULES, &input, &mut out)?;

        let info = self.blueprint_info(id);
        let parent_info = class
            .super_class
            .map(|s| self.blueprint_info(s))
            .unwrap_or_default();
        if info.blueprintable {
            if !parent_info.blueprintable {
                out.add_switch("Blueprintable");
            }
        } else if info.blueprint_type {
            if !parent_info.blueprint_type {
                out.add_switch("BlueprintType");
            }
            out.meta().add_switch("CannotImplementInterfaceInBlueprint");
        }
        Ok(out.build())
    }

    pub(super) fn struct_annotations(
        &self,
        id: ObjectId,
        aggregate: &StructDescriptor,
        usage: &TypeUsage,
    ) -> CodegenResult<String> {
        let parent = aggregate
            .super_struct
            .and_then(|s| self.graph.object(s))
            .and_then(ReflectedObject::as_struct);
        let strip = |flags: StructFlags| flags.difference(StructFlags::COMPUTED);
        let input = FlagInput::new(strip(aggregate.flags), parent.map(|p| strip(p.flags)));
        let mut out = FlagFormatter::new();

        if self.is_struct_blueprint_type(id)
            || usage.blueprint_visible_structs.contains(&id)
            || self.config.generator.make_all_properties_blueprint_read_write
        {
            out.add_switch("BlueprintType");
        }
        evaluate(STRUCT_RULES, &input, &mut out)?;
        Ok(out.build())
    }

    pub(super) fn enum_annotations(
        &self,
        id: ObjectId,
        enumeration: &EnumDescriptor,
        usage: &TypeUsage,
    ) -> CodegenResult<String> {
        let mut out = FlagFormatter::new();
        evaluate(ENUM_RULES, &FlagInput::new(enumeration.flags, None), &mut out)?;

        if usage.blueprint_visible_enums.contains(&id) {
            out.add_switch("BlueprintType");
        } else if self.config.generator.make_enum_classes_blueprint_type {
            let exposable = match enumeration.form {
                EnumForm::EnumClass => usage
                    .enum_underlying_types
                    .get(&id)
                    .map_or(true, |underlying| underlying == "uint8"),
                EnumForm::Regular | EnumForm::Namespaced => true,
            };
            if exposable {
                out.add_switch("BlueprintType");
            }
        }
        Ok(out.build())
    }

    pub(super) fn field_annotations(&self, field: &FieldDescriptor) -> CodegenResult<String> {
        let flags = field.flags;
        let input = FlagInput::new(flags, None);
        let mut out = FlagFormatter::new();

        if self.config.generator.make_all_properties_blueprint_read_write {
            out.add_switch("EditAnywhere");
            if field.array_dim == 1 && self.mapper.is_blueprint_exposable(field) {
                out.add_switch("BlueprintReadWrite");
            }
            out.meta().add_parameter("AllowPrivateAccess", "true")?;
        } else {
            evaluate(PROPERTY_EDIT_RULES, &input, &mut out)?;
            evaluate(PROPERTY_BLUEPRINT_RULES, &input, &mut out)?;
        }
        evaluate(PROPERTY_RULES, &input, &mut out)?;

        if flags.contains(PropertyFlags::NET) {
            match &field.rep_notify {
                Some(notify) if flags.contains(PropertyFlags::REP_NOTIFY) => {
                    out.add_parameter("ReplicatedUsing", notify.clone())?;
                }
                _ => out.add_switch("Replicated"),
            }
        }

        let instanced = PropertyFlags::EXPORT_OBJECT | PropertyFlags::INSTANCED_REFERENCE;
        let instanced_container = PropertyFlags::EXPORT_OBJECT | PropertyFlags::CONTAINS_INSTANCED_REFERENCE;
        if (flags.contains(instanced) || flags.contains(instanced_container)) && holds_strong_object(&field.kind) {
            out.add_switch("Instanced");
        } else if flags.contains(PropertyFlags::EXPORT_OBJECT) {
            out.add_switch("Export");
        }

        Ok(out.build())
    }

    pub(super) fn parameter_annotations(&self, param: &FieldDescriptor) -> CodegenResult<String> {
        let mut out = FlagFormatter::new();
        evaluate(PARAMETER_RULES, &FlagInput::new(param.flags, None), &mut out)?;
        Ok(out.build())
    }

    /// Flags of the same-named method on the nearest ancestor of `owner`
    pub(super) fn inherited_function_flags(&self, owner: ObjectId, name: &str) -> Option<FunctionFlags> {
        self.graph
            .super_chain(owner)
            .into_iter()
            .skip(1)
            .filter_map(|ancestor| self.graph.object(ancestor).and_then(ReflectedObject::as_class))
            .flat_map(|class| class.functions.iter())
            .filter_map(|id| self.graph.object(*id))
            .find(|object| object.name == name)
            .and_then(ReflectedObject::as_function)
            .map(|method| method.flags)
    }

    /// `UFUNCTION(...)` / `UDELEGATE(...)` arguments
    pub(super) fn function_annotations(
        &self,
        function: &ReflectedObject,
        method: &MethodDescriptor,
        pure_virtual: bool,
    ) -> CodegenResult<String> {
        let flags = method.flags;
        let owner = function.outer.and_then(|o| self.graph.object(o));
        let interface_function = owner.map(ReflectedObject::is_interface).unwrap_or(false);
        let baseline = function
            .outer
            .and_then(|o| self.inherited_function_flags(o, &function.name));
        let mut out = FlagFormatter::new();

        let mut callable = false;
        if flags.contains(FunctionFlags::BLUEPRINT_CALLABLE) {
            if flags.contains(FunctionFlags::BLUEPRINT_PURE) && !interface_function {
                out.add_switch("BlueprintPure");
            } else {
                if flags.contains(FunctionFlags::CONST) && !interface_function {
                    out.add_parameter("BlueprintPure", "false")?;
                }
                out.add_switch("BlueprintCallable");
                callable = true;
            }
        }
        if !callable
            && self.config.generator.make_all_functions_blueprint_callable
            && !pure_virtual
            && method.params.iter().all(|p| self.mapper.is_blueprint_exposable(p))
        {
            out.add_switch("BlueprintCallable");
        }

        evaluate(FUNCTION_RULES, &FlagInput::new(flags, baseline), &mut out)?;

        let mut world_context = false;
        let mut latent = false;
        for param in &method.params {
            if !world_context && param.name.to_uppercase().contains("WORLDCONTEXT") {
                out.meta()
                    .add_parameter("WorldContext", format!("\"{}\"", param.name))?;
                world_context = true;
            }
            if !latent {
                if let FieldKind::Struct {
                    struct_type: Some(id),
                } = &param.kind
                {
                    if self.graph.is_child_of(*id, ENGINE_PACKAGE, "LatentActionInfo") {
                        out.meta()
                            .add_parameter("LatentInfo", format!("\"{}\"", param.name))?;
                        out.meta().add_switch("Latent");
                        latent = true;
                    }
                }
            }
            if world_context && latent {
                break;
            }
        }

        Ok(out.build())
    }
}

/// Raw or tracked pointer to an object or class, possibly inside a container
fn holds_strong_object(kind: &FieldKind) -> bool {
    match kind {
        FieldKind::Object { reference, .. } => matches!(reference, ObjectRefKind::Raw | ObjectRefKind::Ptr),
        FieldKind::Class { reference, .. } => matches!(reference, ClassRefKind::Raw | ClassRefKind::Ptr),
        FieldKind::Array { inner } => holds_strong_object(&inner.kind),
        FieldKind::Map { value, .. } => holds_strong_object(&value.kind),
        _ => false,
    }
}
