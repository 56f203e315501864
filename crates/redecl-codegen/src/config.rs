//! Generator configuration (redecl.toml)
//!
//! ```toml
//! [generator]
//! make_all_properties_blueprint_read_write = false
//! make_enum_classes_blueprint_type = false
//! make_all_functions_blueprint_callable = false
//!
//! [modules]
//! ignore_engine_and_core_uobject = true
//! ignored = ["OnlineSubsystem"]
//! primary = "MyGame"
//!
//! [output]
//! clean = true
//! ```

use std::path::Path;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Validation error
    #[error("Invalid config: {0}")]
    ValidationError(String),
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Annotation overrides
    #[serde(default)]
    pub generator: GeneratorOptions,

    /// Module filtering and build descriptor settings
    #[serde(default)]
    pub modules: ModuleOptions,

    /// Output directory handling
    #[serde(default)]
    pub output: OutputOptions,
}

/// Switches that force scripting exposure on generated declarations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratorOptions {
    /// Every field becomes `BlueprintReadWrite` unless its type forbids it
    #[serde(default)]
    pub make_all_properties_blueprint_read_write: bool,

    /// Every scoped enum becomes `BlueprintType` with a `uint8` base
    #[serde(default)]
    pub make_enum_classes_blueprint_type: bool,

    /// Every method becomes `BlueprintCallable` unless a parameter forbids it
    #[serde(default)]
    pub make_all_functions_blueprint_callable: bool,
}

/// Which modules are generated and how their build descriptors look
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleOptions {
    /// Modules to skip entirely
    #[serde(default)]
    pub ignored: Vec<String>,

    /// Skip `Engine` and `CoreUObject`
    #[serde(default = "default_true")]
    pub ignore_engine_and_core_uobject: bool,

    /// Skip every stock engine module (implies the above)
    #[serde(default)]
    pub ignore_all_core_engine_modules: bool,

    /// Module registered as the primary game module
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<String>,

    /// Dependencies every build descriptor lists
    #[serde(default = "default_forced_dependencies")]
    pub forced_dependencies: Vec<String>,
}

/// Output directory handling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputOptions {
    /// Remove the output root before writing
    #[serde(default = "default_true")]
    pub clean: bool,

    /// Emit `<Module>.Build.cs` and the module registration source
    #[serde(default = "default_true")]
    pub emit_build_files: bool,

    /// Emit the build-rule switches newer toolchains expect
    #[serde(default = "default_true")]
    pub modern_build_rules: bool,
}

fn default_true() -> bool {
    true
}

fn default_forced_dependencies() -> Vec<String> {
    vec!["Core".to_string(), "CoreUObject".to_string(), "Engine".to_string()]
}

impl Default for ModuleOptions {
    fn default() -> Self {
        Self {
            ignored: Vec::new(),
            ignore_engine_and_core_uobject: true,
            ignore_all_core_engine_modules: false,
            primary: None,
            forced_dependencies: default_forced_dependencies(),
        }
    }
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            clean: true,
            emit_build_files: true,
            modern_build_rules: true,
        }
    }
}

/// Stock engine modules skipped by `ignore_all_core_engine_modules`
pub const CORE_ENGINE_MODULES: &[&str] = &[
    "ActorLayerUtilities", "ActorSequence", "AIModule", "AndroidPermission",
    "AnimationCore", "AnimationSharing", "AnimGraphRuntime", "AppleImageUtils",
    "ArchVisCharacter", "AssetRegistry", "AssetTags", "AudioAnalyzer", "AudioCapture",
    "AudioExtensions", "AudioMixer", "AudioPlatformConfiguration", "AudioSynesthesia",
    "AugmentedReality", "AutomationUtils", "AvfMediaFactory", "BuildPatchServices",
    "CableComponent", "Chaos", "ChaosCloth", "ChaosNiagara", "ChaosSolvers",
    "ChaosSolverEngine", "CinematicCamera", "ClothingSystemRuntimeCommon",
    "ClothingSystemRuntimeInterface", "ClothingSystemRuntimeNv", "CustomMeshComponent",
    "DatasmithContent", "DeveloperSettings", "EditableMesh", "EngineMessages",
    "EngineSettings", "EyeTracker", "FacialAnimation", "FieldSystemCore",
    "FieldSystemEngine", "Foliage", "GameplayTags", "GameplayTasks", "GeometryCache",
    "GeometryCacheTracks", "GeometryCollectionCore", "GeometryCollectionSimulationCore",
    "GeometryCollectionEngine", "GeometryCollectionTracks", "GooglePAD",
    "HeadMountedDisplay", "ImageWrapper", "ImageWriteQueue", "ImgMedia", "ImgMediaFactory",
    "InputCore", "InteractiveToolsFramework", "JsonUtilities", "Landscape",
    "LevelSequence", "LightPropagationVolumeRuntime", "LiveLinkInterface",
    "LocationServicesBPLibrary", "LuminRuntimeSettings", "MagicLeap", "MagicLeapAR",
    "MagicLeapARPin", "MagicLeapAudio", "MagicLeapController", "MagicLeapEyeTracker",
    "MagicLeapHandMeshing", "MagicLeapHandTracking", "MagicLeapIdentity",
    "MagicLeapImageTracker", "MagicLeapLightEstimation", "MagicLeapPlanes",
    "MagicLeapPrivileges", "MagicLeapSecureStorage", "MagicLeapSharedWorld",
    "MaterialShaderQualitySettings", "MediaAssets", "MediaCompositing", "MediaUtils",
    "MeshDescription", "MobilePatchingUtils", "MotoSynth", "MoviePlayer", "MovieScene",
    "MovieSceneCapture", "MovieSceneTracks", "MRMesh", "NavigationSystem", "NetCore",
    "Niagara", "NiagaraAnimNotifies", "NiagaraCore", "NiagaraShader", "OculusHMD",
    "OculusInput", "OculusMR", "OnlineSubsystem", "OnlineSubsystemUtils", "Overlay",
    "PacketHandler", "Paper2D", "PhysicsCore", "PhysXVehicles", "ProceduralMeshComponent",
    "PropertyAccess", "PropertyPath", "Renderer", "Serialization", "SessionMessages",
    "SignificanceManager", "Slate", "SlateCore", "SoundFields", "StaticMeshDescription",
    "SteamVR", "SteamVRInputDevice", "Synthesis", "TcpMessaging", "TemplateSequence",
    "TimeManagement", "UdpMessaging", "UMG", "UObjectPlugin", "VariantManagerContent",
    "VectorVM", "WmfMediaFactory",
];

impl GeneratorConfig {
    /// Load a configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse a configuration from TOML text
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: GeneratorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let names = self
            .modules
            .ignored
            .iter()
            .chain(&self.modules.forced_dependencies)
            .chain(self.modules.primary.iter());
        for name in names {
            if name.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "module names cannot be empty".to_string(),
                ));
            }
        }

        if let Some(primary) = &self.modules.primary {
            if self.ignored_modules().contains(primary.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "primary module '{}' is also ignored",
                    primary
                )));
            }
        }

        Ok(())
    }

    /// Resolved set of module names that must not be generated
    pub fn ignored_modules(&self) -> FxHashSet<String> {
        let mut ignored: FxHashSet<String> = self.modules.ignored.iter().cloned().collect();
        if self.modules.ignore_engine_and_core_uobject || self.modules.ignore_all_core_engine_modules {
            ignored.insert("Engine".to_string());
            ignored.insert("CoreUObject".to_string());
        }
        if self.modules.ignore_all_core_engine_modules {
            ignored.extend(CORE_ENGINE_MODULES.iter().map(|m| m.to_string()));
        }
        ignored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = GeneratorConfig::from_str("").unwrap();
        assert_eq!(config, GeneratorConfig::default());
        assert!(config.output.clean);
        assert_eq!(config.modules.forced_dependencies, vec!["Core", "CoreUObject", "Engine"]);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[generator]
make_all_properties_blueprint_read_write = true
make_enum_classes_blueprint_type = true

[modules]
ignored = ["OnlineSubsystem"]
ignore_engine_and_core_uobject = false
primary = "MyGame"

[output]
clean = false
"#;
        let config = GeneratorConfig::from_str(toml).unwrap();
        assert!(config.generator.make_all_properties_blueprint_read_write);
        assert!(!config.generator.make_all_functions_blueprint_callable);
        assert_eq!(config.modules.primary.as_deref(), Some("MyGame"));
        assert!(!config.output.clean);

        let ignored = config.ignored_modules();
        assert!(ignored.contains("OnlineSubsystem"));
        assert!(!ignored.contains("Engine"));
    }

    #[test]
    fn test_all_core_modules_implies_engine() {
        let mut config = GeneratorConfig::default();
        config.modules.ignore_engine_and_core_uobject = false;
        config.modules.ignore_all_core_engine_modules = true;
        let ignored = config.ignored_modules();
        assert!(ignored.contains("Engine"));
        assert!(ignored.contains("CoreUObject"));
        for module in CORE_ENGINE_MODULES {
            assert!(ignored.contains(*module), "{} not ignored", module);
        }
    }

    #[test]
    fn test_core_engine_module_list_is_complete() {
        assert_eq!(CORE_ENGINE_MODULES.len(), 131);
        assert_eq!(CORE_ENGINE_MODULES.first(), Some(&"ActorLayerUtilities"));
        assert_eq!(CORE_ENGINE_MODULES.last(), Some(&"WmfMediaFactory"));
        for module in [
            "StaticMeshDescription", "SteamVR", "SteamVRInputDevice", "Synthesis",
            "TcpMessaging", "TemplateSequence", "TimeManagement", "UdpMessaging", "UMG",
            "UObjectPlugin", "VariantManagerContent", "VectorVM", "WmfMediaFactory",
        ] {
            assert!(CORE_ENGINE_MODULES.contains(&module), "{} missing", module);
        }
        let unique: std::collections::HashSet<_> = CORE_ENGINE_MODULES.iter().collect();
        assert_eq!(unique.len(), CORE_ENGINE_MODULES.len());
    }

    #[test]
    fn test_ignored_primary_is_rejected() {
        let toml = r#"
[modules]
ignored = ["MyGame"]
primary = "MyGame"
"#;
        let err = GeneratorConfig::from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_unknown_key_type_is_parse_error() {
        let err = GeneratorConfig::from_str("[output]\nclean = \"yes\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }
}
