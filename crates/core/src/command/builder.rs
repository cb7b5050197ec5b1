//! Turns a catalog entry plus parameters into a shell command

use super::template::substitute;
use crate::catalog::{MethodCatalog, MethodEntry, MethodRole, TemplateShape};
use crate::dispatch::shell_quote;
use crate::error::{Error, Result};
use crate::params::BuildParameters;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A fully substituted command, ready for dispatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedCommand {
    pub text: String,
    pub is_multi_process: bool,
}

impl ResolvedCommand {
    pub fn new(text: impl Into<String>, is_multi_process: bool) -> Self {
        Self {
            text: text.into(),
            is_multi_process,
        }
    }
}

/// Builds commands from a method catalog
#[derive(Debug, Clone, Copy)]
pub struct CommandBuilder<'a> {
    catalog: &'a MethodCatalog,
}

impl<'a> CommandBuilder<'a> {
    pub fn new(catalog: &'a MethodCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'a MethodCatalog {
        self.catalog
    }

    /// Build the command for a build method
    pub fn build(&self, method: &str, params: &BuildParameters) -> Result<ResolvedCommand> {
        self.resolve(MethodRole::Build, method, params)
    }

    /// Build the command for a run method
    pub fn run(&self, method: &str, params: &BuildParameters) -> Result<ResolvedCommand> {
        self.resolve(MethodRole::Run, method, params)
    }

    pub fn resolve(
        &self,
        role: MethodRole,
        method: &str,
        params: &BuildParameters,
    ) -> Result<ResolvedCommand> {
        let entry = self.catalog.lookup(role, method)?;
        let values = substitution_values(entry, params)?;
        let text = substitute(&entry.name, &entry.template, &values)?;
        debug!("Built {} command for '{}': {}", role.label(), entry.name, text);
        Ok(ResolvedCommand::new(text, entry.is_multi_process()))
    }
}

/// Characters a file name may carry into a command without quoting
fn is_shell_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || "._-+/=,:@%".contains(c)
}

/// A name as one shell word, quoted only when it needs to be
fn shell_word(name: &str) -> String {
    if !name.is_empty() && name.chars().all(is_shell_safe) {
        name.to_string()
    } else {
        shell_quote(name)
    }
}

/// Ordered values for an entry's template, following its shape
fn substitution_values(entry: &MethodEntry, params: &BuildParameters) -> Result<Vec<String>> {
    let source = shell_word(&params.source_name);
    let output = shell_word(&params.output_name);

    if !entry.is_multi_process() {
        return Ok(match entry.shape {
            TemplateShape::Standard => vec![source, output],
            TemplateShape::BuildFileDriven | TemplateShape::Executable => vec![output],
            // Rejected at registration; only reachable for hand-built entries
            TemplateShape::PortableSource => Vec::new(),
        });
    }

    let procs = params
        .process_count
        .ok_or_else(|| Error::MissingProcessCount(entry.name.clone()))?
        .to_string();

    Ok(match entry.shape {
        TemplateShape::PortableSource => {
            let portable = shell_word(&format!("_{}", params.output_name));
            vec![procs.clone(), source, procs, portable, output]
        }
        TemplateShape::BuildFileDriven | TemplateShape::Executable => vec![procs, output],
        TemplateShape::Standard => vec![procs, source, output],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ProcessCount;
    use std::path::Path;

    fn params(file: &str, procs: Option<i64>) -> BuildParameters {
        let mut params = BuildParameters::from_active_file(Some(Path::new(file))).unwrap();
        params.process_count = procs.map(ProcessCount::clamped);
        params
    }

    #[test]
    fn test_single_process_standard() {
        let builder = CommandBuilder::new(MethodCatalog::builtin());
        let cmd = builder.build("Basic (No MPI)", &params("code.c", None)).unwrap();
        assert_eq!(cmd.text, "dslc code.c -o code");
        assert!(!cmd.is_multi_process);

        let cmd = builder.build("Debug (No MPI)", &params("code.c", None)).unwrap();
        assert_eq!(cmd.text, "dslc -g -O0 -Wall code.c -o code");
    }

    #[test]
    fn test_multi_process_standard() {
        let builder = CommandBuilder::new(MethodCatalog::builtin());
        let cmd = builder.build("MPI Manual", &params("code.c", Some(8))).unwrap();
        assert_eq!(cmd.text, "dslc --mpi --nprocs=8 code.c -o code");
        assert!(cmd.is_multi_process);
    }

    #[test]
    fn test_build_file_driven_never_uses_source() {
        let builder = CommandBuilder::new(MethodCatalog::builtin());

        let cmd = builder.build("MPI with Makefile", &params("code.c", Some(4))).unwrap();
        assert_eq!(cmd.text, "make NPROCS=4 code");
        assert!(cmd.is_multi_process);
        assert!(!cmd.text.contains("code.c"));

        let cmd = builder.build("Makefile (No MPI)", &params("code.c", None)).unwrap();
        assert_eq!(cmd.text, "make code");
        assert!(!cmd.is_multi_process);
    }

    #[test]
    fn test_portable_source_shape() {
        let builder = CommandBuilder::new(MethodCatalog::builtin());
        let cmd = builder
            .build("MPI Portable Source", &params("code.c", Some(4)))
            .unwrap();

        assert_eq!(cmd.text.matches("code.c").count(), 1);
        assert!(cmd.text.matches("code").count() >= 2);
        assert_eq!(cmd.text.matches("_code").count(), 1);
        assert_eq!(cmd.text.matches('4').count(), 2);
        assert!(cmd.is_multi_process);
    }

    #[test]
    fn test_run_methods() {
        let builder = CommandBuilder::new(MethodCatalog::builtin());
        assert_eq!(
            builder.run("Basic (No MPI)", &params("code.c", None)).unwrap().text,
            "./code"
        );
        assert_eq!(
            builder
                .run("Valgrind (No MPI)", &params("code.c", Some(3)))
                .unwrap()
                .text,
            "valgrind --leak-check=full ./code"
        );
        assert_eq!(
            builder.run("MPI", &params("code.c", Some(16))).unwrap().text,
            "mpirun -np 16 ./code"
        );
        assert_eq!(
            builder
                .run("MPI with Slurm", &params("code.c", Some(500)))
                .unwrap()
                .text,
            "srun -n 200 ./code"
        );
    }

    #[test]
    fn test_names_with_spaces_stay_one_word() {
        let builder = CommandBuilder::new(MethodCatalog::builtin());

        let cmd = builder.build("Basic (No MPI)", &params("heat 2.c", None)).unwrap();
        assert_eq!(cmd.text, "dslc 'heat 2.c' -o 'heat 2'");

        let cmd = builder.run("MPI", &params("it's.c", Some(2))).unwrap();
        assert_eq!(cmd.text, r"mpirun -np 2 ./'it'\''s'");

        let cmd = builder
            .build("MPI Portable Source", &params("a b.c", Some(2)))
            .unwrap();
        assert_eq!(
            cmd.text,
            "dslc --mpi --nprocs=2 --emit-portable 'a b.c' && mpicc -DDSL_NPROCS=2 -x c '_a b' -o 'a b'"
        );

        let cmd = builder.build("Basic (No MPI)", &params("heat-2d_v1.c", None)).unwrap();
        assert_eq!(cmd.text, "dslc heat-2d_v1.c -o heat-2d_v1");
    }

    #[test]
    fn test_multi_process_without_count() {
        let builder = CommandBuilder::new(MethodCatalog::builtin());
        let err = builder.run("MPI", &params("code.c", None)).unwrap_err();
        assert!(matches!(err, Error::MissingProcessCount(ref name) if name == "MPI"));
    }

    #[test]
    fn test_unknown_method_propagates() {
        let builder = CommandBuilder::new(MethodCatalog::builtin());
        let err = builder.build("MPI", &params("code.c", Some(2))).unwrap_err();
        assert!(matches!(err, Error::UnknownMethod { catalog: "build", .. }));
    }

    #[test]
    fn test_no_unresolved_placeholders() {
        let catalog = MethodCatalog::builtin();
        let builder = CommandBuilder::new(catalog);
        for file in ["code.c", "solver.dsl", "a"] {
            for procs in [None, Some(1), Some(57), Some(200)] {
                for entry in catalog.build_methods() {
                    if entry.is_multi_process() && procs.is_none() {
                        continue;
                    }
                    let cmd = builder.build(&entry.name, &params(file, procs)).unwrap();
                    assert!(!cmd.text.contains("{}"), "{}: {}", entry.name, cmd.text);
                }
            }
        }
    }
}
