//! End-to-end dump tests
//!
//! Each test runs a complete dump over a fixture graph and inspects the
//! rendered files.

mod common;

use common::*;
use redecl_codegen::{generate, CodegenError, GeneratorConfig};
use redecl_reflect::*;
use tempfile::tempdir;

fn contents<'a>(output: &'a redecl_codegen::DumpOutput, path: &str) -> &'a str {
    match output.file(path) {
        Some(file) => &file.contents,
        None => panic!(
            "missing {}; produced {:?}",
            path,
            output.files.iter().map(|f| f.path.display().to_string()).collect::<Vec<_>>()
        ),
    }
}

#[test]
fn test_dump_produces_expected_file_set() {
    let fixture = arsenal();
    let output = generate(&fixture.graph, &GeneratorConfig::default()).unwrap();

    for path in [
        "Game/Public/OnFiredDelegate.h",
        "Game/Public/Weapon.h",
        "Game/Private/Weapon.cpp",
        "Game/Public/Interactable.h",
        "Game/Public/HitInfo.h",
        "Game/Private/HitInfo.cpp",
        "Game/Public/EWeaponMode.h",
        "Game/Game.Build.cs",
        "Game/Private/GameModule.cpp",
        "Combat/Public/Damage.h",
        "Combat/Combat.Build.cs",
    ] {
        assert!(output.file(path).is_some(), "expected {}", path);
    }
    assert!(output.file("Engine/Public/Actor.h").is_none());
    assert!(output.file("Game/Private/Interactable.cpp").is_none());
    assert!(output.file("Game/Private/EWeaponMode.cpp").is_none());
}

#[test]
fn test_class_header_declares_members() {
    let fixture = arsenal();
    let output = generate(&fixture.graph, &GeneratorConfig::default()).unwrap();
    let header = contents(&output, "Game/Public/Weapon.h");
    let lines = trimmed_lines(header);

    assert_eq!(lines[0], "#pragma once");
    assert!(lines.contains(&"#include \"Weapon.generated.h\""));
    assert!(lines.contains(&"class AWeapon : public AActor, public IInteractable {"));
    assert!(lines.contains(&"GENERATED_BODY()"));
    assert!(lines.contains(&"uint8 bLoaded: 1;"));
    assert!(lines.contains(&"int32 Ammo;"));
    assert!(lines.contains(&"UDamage* LastDamage;"));
    assert!(lines.contains(&"TMap<FHitInfo, int32> HitsByInfo;"));
    assert!(lines.contains(&"AWeapon();"));
    assert!(lines.contains(&"void Fire();"));
    assert!(lines.contains(&"// Fix for true pure virtual functions not being implemented"));
    assert!(lines.contains(&"int32 Interact() override PURE_VIRTUAL(Interact, return 0;);"));

    // Object references are forward declared, not included
    assert!(lines.contains(&"class UDamage;"));
    assert!(lines.contains(&"#include \"Interactable.h\""));
    assert!(lines.contains(&"#include \"HitInfo.h\""));
}

#[test]
fn test_replicated_fields_register_once() {
    let fixture = arsenal();
    let output = generate(&fixture.graph, &GeneratorConfig::default()).unwrap();

    let header = contents(&output, "Game/Public/Weapon.h");
    assert_eq!(header.matches("GetLifetimeReplicatedProps").count(), 1);

    let source = contents(&output, "Game/Private/Weapon.cpp");
    assert!(source.contains("#include \"Net/UnrealNetwork.h\""));
    assert_eq!(source.matches("DOREPLIFETIME(").count(), 1);
    assert!(source.contains("DOREPLIFETIME(AWeapon, Ammo);"));
    assert!(source.contains("Super::GetLifetimeReplicatedProps(OutLifetimeProps);"));
}

#[test]
fn test_class_source_restores_defaults_and_stubs() {
    let fixture = arsenal();
    let output = generate(&fixture.graph, &GeneratorConfig::default()).unwrap();
    let source = contents(&output, "Game/Private/Weapon.cpp");
    let lines = trimmed_lines(source);

    assert_eq!(lines[0], "#include \"Weapon.h\"");
    assert!(lines.contains(&"void AWeapon::Fire() {"));
    assert!(lines.contains(&"AWeapon::AWeapon() {"));
    assert!(lines.contains(&"this->bLoaded = true;"));
    assert!(lines.contains(&"this->Ammo = 30;"));
    assert!(lines.contains(&"this->LastDamage = NULL;"));
    assert!(!source.contains("this->HitsByInfo"));
}

#[test]
fn test_cross_module_reference_is_stubbed_and_listed() {
    let fixture = arsenal();
    let output = generate(&fixture.graph, &GeneratorConfig::default()).unwrap();

    let source = contents(&output, "Game/Private/Weapon.cpp");
    assert!(source.contains("//CROSS-MODULE INCLUDE V2: -ModuleName=Combat -ObjectName=Damage -FallbackName=Damage"));

    let header = contents(&output, "Game/Public/Weapon.h");
    assert!(header.contains("//CROSS-MODULE INCLUDE V2: -ModuleName=Engine -ObjectName=Actor -FallbackName=Actor"));

    let rules = contents(&output, "Game/Game.Build.cs");
    for module in ["\"Combat\",", "\"Core\",", "\"CoreUObject\",", "\"Engine\","] {
        assert!(rules.contains(module), "missing {} in\n{}", module, rules);
    }
    assert!(!rules.contains("\"Game\","));

    let combat_rules = contents(&output, "Combat/Combat.Build.cs");
    assert!(!combat_rules.contains("\"Game\","));
}

#[test]
fn test_interface_emits_both_halves() {
    let fixture = arsenal();
    let output = generate(&fixture.graph, &GeneratorConfig::default()).unwrap();
    let lines = trimmed_lines(contents(&output, "Game/Public/Interactable.h"));

    assert!(lines.iter().any(|l| l.starts_with("UINTERFACE(")));
    assert!(lines.contains(&"class UInteractable : public UInterface {"));
    assert!(lines.contains(&"class IInteractable : public IInterface {"));
    assert!(lines.contains(&"virtual int32 Interact() PURE_VIRTUAL(Interact, return 0;);"));
}

#[test]
fn test_enum_keeps_sequence_gaps() {
    let fixture = arsenal();
    let output = generate(&fixture.graph, &GeneratorConfig::default()).unwrap();
    let header = contents(&output, "Game/Public/EWeaponMode.h");
    let lines = trimmed_lines(header);

    assert!(lines.iter().any(|l| l.starts_with("enum class EWeaponMode")));
    let start = lines.iter().position(|l| *l == "Single,").unwrap();
    assert_eq!(
        &lines[start..start + 6],
        &["Single,", "Burst,", "Auto,", "Charged = 0x5,", "Overheated,", "};"]
    );
    assert!(!header.contains("_MAX"));
}

#[test]
fn test_top_level_delegate_declaration() {
    let fixture = arsenal();
    let output = generate(&fixture.graph, &GeneratorConfig::default()).unwrap();
    let header = contents(&output, "Game/Public/OnFiredDelegate.h");

    let line = header
        .lines()
        .find(|l| l.contains("DECLARE_DYNAMIC"))
        .unwrap();
    assert!(line.starts_with("UDELEGATE("));
    assert!(line.ends_with("DECLARE_DYNAMIC_MULTICAST_DELEGATE_OneParam(FOnFired, int32, Shots);"));
}

#[test]
fn test_struct_map_key_gets_hash_stub() {
    let fixture = arsenal();
    let output = generate(&fixture.graph, &GeneratorConfig::default()).unwrap();

    let header = contents(&output, "Game/Public/HitInfo.h");
    assert!(header.contains("struct FHitInfo {"));
    assert!(header.contains("FORCEINLINE uint32 GetTypeHash(const FHitInfo) { return 0; }"));
    assert!(header.contains("GAME_API FHitInfo();"));

    let source = contents(&output, "Game/Private/HitInfo.cpp");
    assert!(source.contains("FHitInfo::FHitInfo() {"));
    assert!(source.contains("this->Amount = 0.00f;"));
}

#[test]
fn test_build_files_can_be_disabled() {
    let fixture = arsenal();
    let mut config = GeneratorConfig::default();
    config.output.emit_build_files = false;
    let output = generate(&fixture.graph, &config).unwrap();

    assert!(output.file("Game/Game.Build.cs").is_none());
    assert!(output.file("Game/Private/GameModule.cpp").is_none());
    assert!(output.file("Game/Public/Weapon.h").is_some());
}

#[test]
fn test_primary_module_registration() {
    let fixture = arsenal();
    let mut config = GeneratorConfig::default();
    config.modules.primary = Some("Game".to_string());
    let output = generate(&fixture.graph, &config).unwrap();

    let game = contents(&output, "Game/Private/GameModule.cpp");
    assert!(game.contains("IMPLEMENT_PRIMARY_GAME_MODULE(FDefaultGameModuleImpl, Game, Game);"));
    let combat = contents(&output, "Combat/Private/CombatModule.cpp");
    assert!(combat.contains("IMPLEMENT_MODULE(FDefaultGameModuleImpl, Combat);"));
}

#[test]
fn test_ignored_module_is_skipped() {
    let fixture = arsenal();
    let mut config = GeneratorConfig::default();
    config.modules.ignored.push("Combat".to_string());
    let output = generate(&fixture.graph, &config).unwrap();

    assert!(output.file("Combat/Public/Damage.h").is_none());
    assert!(output.file("Combat/Combat.Build.cs").is_none());
    // References into an ignored module are still stubbed
    assert!(contents(&output, "Game/Private/Weapon.cpp").contains("-ModuleName=Combat"));
}

#[test]
fn test_unflagged_delegate_is_fatal() {
    let mut graph = Snapshot::new();
    engine_roots(&mut graph);
    graph.push(method("OnBroken__DelegateSignature", GAME, FunctionFlags::NONE, vec![]));

    let err = generate(&graph, &GeneratorConfig::default()).unwrap_err();
    assert!(matches!(err, CodegenError::MissingDelegateFlag { ref object } if object == "OnBroken__DelegateSignature"));
}

#[test]
fn test_delegate_parameter_limit() {
    let mut graph = Snapshot::new();
    engine_roots(&mut graph);
    let params = (0..10)
        .map(|i| FieldDescriptor::param(format!("P{}", i), FieldKind::Int32, PropertyFlags::NONE))
        .collect();
    graph.push(method("OnMany__DelegateSignature", GAME, FunctionFlags::DELEGATE, params));

    let err = generate(&graph, &GeneratorConfig::default()).unwrap_err();
    assert!(matches!(err, CodegenError::TooManyDelegateParameters { count: 10, .. }));
}

#[test]
fn test_unsupported_field_kind_is_fatal() {
    let mut graph = Snapshot::new();
    let (object, _, _) = engine_roots(&mut graph);
    let mut class = native_class("Odd", GAME, Some(object));
    if let ObjectKind::Class(descriptor) = &mut class.kind {
        descriptor.fields.push(public_field(
            "Blob",
            FieldKind::Unsupported {
                class_name: "OptionalProperty".to_string(),
            },
        ));
    }
    graph.push(class);

    let err = generate(&graph, &GeneratorConfig::default()).unwrap_err();
    assert!(matches!(err, CodegenError::UnsupportedFieldKind { ref kind, .. } if kind == "OptionalProperty"));
}

#[test]
fn test_missing_access_specifier_is_diagnosed() {
    let mut graph = Snapshot::new();
    let (object, _, _) = engine_roots(&mut graph);
    let mut class = native_class("Loose", GAME, Some(object));
    if let ObjectKind::Class(descriptor) = &mut class.kind {
        descriptor.fields.push(FieldDescriptor::new("Count", FieldKind::Int32));
    }
    graph.push(class);

    let output = generate(&graph, &GeneratorConfig::default()).unwrap();
    assert_eq!(output.diagnostics.len(), 1);
    assert_eq!(output.diagnostics[0].member.as_deref(), Some("Count"));
    assert!(contents(&output, "Game/Public/Loose.h").contains("int32 Count;"));
}

#[test]
fn test_write_to_cleans_previous_output() {
    let fixture = arsenal();
    let output = generate(&fixture.graph, &GeneratorConfig::default()).unwrap();

    let dir = tempdir().unwrap();
    let root = dir.path().join("out");
    std::fs::create_dir_all(root.join("Stale")).unwrap();
    std::fs::write(root.join("Stale/Old.h"), "old").unwrap();

    let written = output.write_to(&root, true).unwrap();
    assert_eq!(written, output.files.len());
    assert!(!root.join("Stale").exists());

    let header = std::fs::read_to_string(root.join("Game/Public/Weapon.h")).unwrap();
    assert_eq!(header, contents(&output, "Game/Public/Weapon.h"));
}

#[test]
fn test_write_to_keeps_previous_output_without_clean() {
    let fixture = arsenal();
    let output = generate(&fixture.graph, &GeneratorConfig::default()).unwrap();

    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("keep.txt"), "keep").unwrap();
    output.write_to(dir.path(), false).unwrap();
    assert!(dir.path().join("keep.txt").exists());
    assert!(dir.path().join("Game/Game.Build.cs").exists());
}

#[test]
fn test_self_nested_base_still_renders_stub() {
    let mut graph = Snapshot::new();
    let (object, _, _) = engine_roots(&mut graph);
    let base = graph.push(native_class("Base", "/Script/Engine", Some(object)));
    graph.object_mut(base).unwrap().outer = Some(base);
    graph.push(native_class("Child", "/Script/Game", Some(base)));

    let output = generate(&graph, &GeneratorConfig::default()).unwrap();
    let header = contents(&output, "Game/Public/Child.h");
    assert!(header.contains("class UChild : public UBase {"));
    assert!(header.contains("//CROSS-MODULE INCLUDE V2: -ModuleName=Engine -ObjectName=Base -FallbackName=Base"));
}

#[test]
fn test_generation_is_deterministic() {
    let fixture = arsenal();
    let first = generate(&fixture.graph, &GeneratorConfig::default()).unwrap();
    let second = generate(&fixture.graph, &GeneratorConfig::default()).unwrap();
    assert_eq!(first.files, second.files);
}
