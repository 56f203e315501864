//! Enumeration declarations

use redecl_reflect::{EnumDescriptor, EnumForm, ObjectId};

use super::Synthesizer;
use crate::context::RunContext;
use crate::error::CodegenResult;
use crate::file::SourceFile;
use crate::names::sanitize_enum_entry;

impl Synthesizer<'_> {
    pub(super) fn declare_enum(
        &self,
        id: ObjectId,
        enumeration: &EnumDescriptor,
        file: &mut SourceFile,
        run: &mut RunContext,
    ) -> CodegenResult<()> {
        let name = self.graph.get(id)?.name.clone();
        let annotations = self.enum_annotations(id, enumeration, &run.usage)?;
        file.append_line(&format!("UENUM({})", annotations));

        match enumeration.form {
            EnumForm::Namespaced => {
                file.append_line(&format!("namespace {} {{", name));
                file.begin_indent();
                file.append_line("enum Type {");
            }
            EnumForm::Regular => file.append_line(&format!("enum {} {{", name)),
            EnumForm::EnumClass => {
                let underlying = match run.usage.enum_underlying_types.get(&id) {
                    Some(_) if run.usage.blueprint_visible_enums.contains(&id) => Some("uint8"),
                    Some(recorded) => Some(recorded.as_str()),
                    None if self.config.generator.make_enum_classes_blueprint_type => Some("uint8"),
                    None => None,
                };
                match underlying {
                    Some(underlying) => file.append_line(&format!("enum class {} : {} {{", name, underlying)),
                    None => file.append_line(&format!("enum class {} {{", name)),
                }
            }
        }

        file.begin_indent();
        for line in entry_lines(&name, enumeration) {
            file.append_line(&line);
        }
        file.end_indent();
        file.append_line("};");

        if enumeration.form == EnumForm::Namespaced {
            file.end_indent();
            file.append_line("}");
        }
        Ok(())
    }
}

/// Entry lines with explicit values only where the sequence breaks.
///
/// A trailing `<Enum>_MAX` that continues the sequence is dropped; any other
/// `_MAX` entry is hidden from editors.
fn entry_lines(enum_name: &str, enumeration: &EnumDescriptor) -> Vec<String> {
    let generated_max = format!("{}_MAX", enum_name);
    let mut expected: i64 = 0;
    let mut lines = Vec::with_capacity(enumeration.entries.len());

    for entry in &enumeration.entries {
        let name = sanitize_enum_entry(&entry.name);
        let mut line = name.to_string();
        let explicit = entry.value != expected;
        if explicit {
            let sign = if entry.value < 0 { "-" } else { "" };
            line.push_str(&format!(" = {}0x{:X}", sign, entry.value.unsigned_abs()));
        }
        expected = entry.value.wrapping_add(1);

        if name.ends_with("_MAX") {
            if name == generated_max && !explicit {
                continue;
            }
            line.push_str(" UMETA(Hidden)");
        }
        line.push(',');
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gap_gets_explicit_value() {
        let e = EnumDescriptor::new(
            EnumForm::EnumClass,
            [
                ("EMode::A", 0),
                ("EMode::B", 1),
                ("EMode::C", 2),
                ("EMode::D", 5),
                ("EMode::E", 6),
                ("EMode::EMode_MAX", 7),
            ],
        );
        assert_eq!(entry_lines("EMode", &e), vec!["A,", "B,", "C,", "D = 0x5,", "E,"]);
    }

    #[test]
    fn test_out_of_sequence_max_is_hidden() {
        let e = EnumDescriptor::new(EnumForm::Regular, [("Low", 0), ("High", 1), ("ELevel_MAX", 9)]);
        assert_eq!(
            entry_lines("ELevel", &e),
            vec!["Low,", "High,", "ELevel_MAX = 0x9 UMETA(Hidden),"]
        );
    }

    #[test]
    fn test_negative_value() {
        let e = EnumDescriptor::new(EnumForm::Regular, [("Invalid", -1), ("First", 0)]);
        assert_eq!(entry_lines("EThing", &e), vec!["Invalid = -0x1,", "First,"]);
    }

    #[test]
    fn test_foreign_max_is_hidden() {
        let e = EnumDescriptor::new(EnumForm::Regular, [("A", 0), ("OTHER_MAX", 1)]);
        assert_eq!(entry_lines("EThing", &e), vec!["A,", "OTHER_MAX UMETA(Hidden),"]);
    }
}
