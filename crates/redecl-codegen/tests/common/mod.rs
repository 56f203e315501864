//! Shared reflection-graph fixtures for the codegen integration tests

#![allow(dead_code)]

use redecl_reflect::*;

pub const GAME: &str = "/Script/Game";
pub const COMBAT: &str = "/Script/Combat";

/// Ids of the objects in [`arsenal`]
pub struct Arsenal {
    pub graph: Snapshot,
    pub actor: ObjectId,
    pub damage: ObjectId,
    pub interactable: ObjectId,
    pub hit_info: ObjectId,
    pub weapon: ObjectId,
    pub weapon_mode: ObjectId,
    pub on_fired: ObjectId,
}

pub fn public_field(name: &str, kind: FieldKind) -> FieldDescriptor {
    FieldDescriptor::new(name, kind).with_flags(PropertyFlags::NATIVE_ACCESS_PUBLIC)
}

pub fn native_class(name: &str, package: &str, super_class: Option<ObjectId>) -> ReflectedObject {
    ReflectedObject::new(
        name,
        package,
        ObjectKind::Class(ClassDescriptor {
            flags: ClassFlags::NATIVE,
            super_class,
            ..Default::default()
        }),
    )
}

pub fn method(name: &str, package: &str, flags: FunctionFlags, params: Vec<FieldDescriptor>) -> ReflectedObject {
    ReflectedObject::new(
        name,
        package,
        ObjectKind::Function(MethodDescriptor {
            flags: flags | FunctionFlags::PUBLIC,
            params,
            sparse: false,
        }),
    )
}

/// Engine roots every fixture derives from
pub fn engine_roots(graph: &mut Snapshot) -> (ObjectId, ObjectId, ObjectId) {
    let object = graph.push(native_class("Object", "/Script/CoreUObject", None));
    let interface = graph.push(ReflectedObject::new(
        "Interface",
        "/Script/CoreUObject",
        ObjectKind::Interface(ClassDescriptor {
            flags: ClassFlags::NATIVE | ClassFlags::INTERFACE,
            super_class: Some(object),
            ..Default::default()
        }),
    ));
    let actor = graph.push(native_class("Actor", "/Script/Engine", Some(object)));
    (object, interface, actor)
}

/// A small game module referencing a second module and the engine
pub fn arsenal() -> Arsenal {
    let mut graph = Snapshot::new();
    let (object, interface, actor) = engine_roots(&mut graph);

    let damage = graph.push(native_class("Damage", COMBAT, Some(object)));

    let weapon_mode = graph.push(ReflectedObject::new(
        "EWeaponMode",
        GAME,
        ObjectKind::Enum(EnumDescriptor::new(
            EnumForm::EnumClass,
            [
                ("EWeaponMode::Single", 0),
                ("EWeaponMode::Burst", 1),
                ("EWeaponMode::Auto", 2),
                ("EWeaponMode::Charged", 5),
                ("EWeaponMode::Overheated", 6),
                ("EWeaponMode::EWeaponMode_MAX", 7),
            ],
        )),
    ));

    let on_fired = graph.push(method(
        "OnFired__DelegateSignature",
        GAME,
        FunctionFlags::DELEGATE | FunctionFlags::MULTICAST_DELEGATE,
        vec![FieldDescriptor::param("Shots", FieldKind::Int32, PropertyFlags::NONE)],
    ));

    let interact = graph.push(method(
        "Interact",
        GAME,
        FunctionFlags::NATIVE,
        vec![FieldDescriptor::return_value(FieldKind::Int32)],
    ));
    let interactable = graph.push(ReflectedObject::new(
        "Interactable",
        GAME,
        ObjectKind::Interface(ClassDescriptor {
            flags: ClassFlags::NATIVE | ClassFlags::INTERFACE,
            super_class: Some(interface),
            functions: vec![interact],
            ..Default::default()
        }),
    ));
    if let Some(function) = graph.object_mut(interact) {
        function.outer = Some(interactable);
    }

    let hit_info = graph.push(ReflectedObject::new(
        "HitInfo",
        GAME,
        ObjectKind::Struct(StructDescriptor {
            flags: StructFlags::NATIVE,
            fields: vec![public_field("Amount", FieldKind::Float)],
            size: 4,
            ..Default::default()
        }),
    ));

    let fire = graph.push(method(
        "Fire",
        GAME,
        FunctionFlags::NATIVE | FunctionFlags::BLUEPRINT_CALLABLE,
        vec![],
    ));

    let mut defaults = InstanceData::zeroed(32);
    defaults.write_u8(0, 0x01);
    defaults.write_i32(4, 30);

    let weapon = graph.push(ReflectedObject::new(
        "Weapon",
        GAME,
        ObjectKind::Class(ClassDescriptor {
            flags: ClassFlags::NATIVE,
            super_class: Some(actor),
            interfaces: vec![interactable],
            fields: vec![
                public_field("bLoaded", FieldKind::bitfield(0, 0x01)).at(0),
                FieldDescriptor::new("Ammo", FieldKind::Int32)
                    .with_flags(PropertyFlags::NATIVE_ACCESS_PUBLIC | PropertyFlags::NET)
                    .at(4),
                public_field("LastDamage", FieldKind::object(Some(damage))).at(8),
                public_field(
                    "HitsByInfo",
                    FieldKind::map_of(
                        FieldKind::Struct {
                            struct_type: Some(hit_info),
                        },
                        FieldKind::Int32,
                    ),
                )
                .at(16),
            ],
            functions: vec![fire],
            default_object: Some(defaults),
            ..Default::default()
        }),
    ));
    if let Some(function) = graph.object_mut(fire) {
        function.outer = Some(weapon);
    }

    Arsenal {
        graph,
        actor,
        damage,
        interactable,
        hit_info,
        weapon,
        weapon_mode,
        on_fired,
    }
}

/// Lines of `text` with surrounding whitespace removed
pub fn trimmed_lines(text: &str) -> Vec<&str> {
    text.lines().map(str::trim).collect()
}
