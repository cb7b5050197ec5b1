use serde::{Deserialize, Serialize};
use std::fmt;

/// Token marking a method that launches several cooperating processes
pub const DISTRIBUTED_MARKER: &str = "MPI";
/// Qualifier that cancels [`DISTRIBUTED_MARKER`]
pub const NO_DISTRIBUTED_QUALIFIER: &str = "No MPI";
/// Token marking a method driven by a build file
pub const BUILD_FILE_MARKER: &str = "Makefile";
/// Token marking the two-stage portable source build
pub const PORTABLE_SOURCE_MARKER: &str = "Portable Source";

/// Which of the two registries an entry lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodRole {
    Build,
    Run,
}

impl MethodRole {
    pub fn label(self) -> &'static str {
        match self {
            MethodRole::Build => "build",
            MethodRole::Run => "run",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessKind {
    SingleProcess,
    MultiProcess,
}

/// Order and number of values a template is filled with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateShape {
    /// `(source, output)`, prefixed by the process count when multi-process
    Standard,
    /// `(output)`, prefixed by the process count when multi-process
    BuildFileDriven,
    /// `(procs, source, procs, "_" + output, output)`
    PortableSource,
    /// Run methods: `(output)`, prefixed by the process count when multi-process
    Executable,
}

impl ProcessKind {
    /// Classify a method by its name: multi-process iff the name carries the
    /// distributed marker without the explicit non-distributed qualifier.
    pub fn from_method_name(name: &str) -> Self {
        if name.contains(DISTRIBUTED_MARKER) && !name.contains(NO_DISTRIBUTED_QUALIFIER) {
            ProcessKind::MultiProcess
        } else {
            ProcessKind::SingleProcess
        }
    }

    pub fn is_multi_process(self) -> bool {
        self == ProcessKind::MultiProcess
    }
}

impl TemplateShape {
    /// Shape of a method, decided by name tokens and role. The secondary match
    /// is independent of the process kind.
    pub fn from_method_name(name: &str, role: MethodRole) -> Self {
        match role {
            MethodRole::Run => TemplateShape::Executable,
            MethodRole::Build if name.contains(PORTABLE_SOURCE_MARKER) => {
                TemplateShape::PortableSource
            }
            MethodRole::Build if name.contains(BUILD_FILE_MARKER) => {
                TemplateShape::BuildFileDriven
            }
            MethodRole::Build => TemplateShape::Standard,
        }
    }

    /// Number of placeholders a template of this shape must carry, or `None`
    /// when the shape cannot be combined with `kind`.
    pub fn arity(self, kind: ProcessKind) -> Option<usize> {
        let procs = usize::from(kind.is_multi_process());
        match self {
            TemplateShape::PortableSource if kind.is_multi_process() => Some(5),
            TemplateShape::PortableSource => None,
            TemplateShape::Standard => Some(2 + procs),
            TemplateShape::BuildFileDriven | TemplateShape::Executable => Some(1 + procs),
        }
    }
}

/// A named, parameterized command template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodEntry {
    pub name: String,
    pub template: String,
    pub role: MethodRole,
    pub kind: ProcessKind,
    pub shape: TemplateShape,
}

impl MethodEntry {
    /// Create an entry, deriving kind and shape from the name once.
    pub fn new(name: impl Into<String>, template: impl Into<String>, role: MethodRole) -> Self {
        let name = name.into();
        let kind = ProcessKind::from_method_name(&name);
        let shape = TemplateShape::from_method_name(&name, role);
        Self {
            name,
            template: template.into(),
            role,
            kind,
            shape,
        }
    }

    pub fn is_multi_process(&self) -> bool {
        self.kind.is_multi_process()
    }

    pub fn expected_arity(&self) -> Option<usize> {
        self.shape.arity(self.kind)
    }
}

impl fmt::Display for ProcessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessKind::SingleProcess => write!(f, "single-process"),
            ProcessKind::MultiProcess => write!(f, "multi-process"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distributed_marker_classification() {
        assert_eq!(
            ProcessKind::from_method_name("MPI Manual"),
            ProcessKind::MultiProcess
        );
        assert_eq!(
            ProcessKind::from_method_name("Basic (No MPI)"),
            ProcessKind::SingleProcess
        );
        assert_eq!(
            ProcessKind::from_method_name("Makefile (No MPI)"),
            ProcessKind::SingleProcess
        );
        assert_eq!(
            ProcessKind::from_method_name("Valgrind"),
            ProcessKind::SingleProcess
        );
    }

    #[test]
    fn test_shape_is_independent_of_kind() {
        let entry = MethodEntry::new("MPI with Makefile", "make NPROCS={} {}", MethodRole::Build);
        assert!(entry.is_multi_process());
        assert_eq!(entry.shape, TemplateShape::BuildFileDriven);
        assert_eq!(entry.expected_arity(), Some(2));

        let entry = MethodEntry::new("Makefile (No MPI)", "make {}", MethodRole::Build);
        assert!(!entry.is_multi_process());
        assert_eq!(entry.shape, TemplateShape::BuildFileDriven);
        assert_eq!(entry.expected_arity(), Some(1));
    }

    #[test]
    fn test_run_methods_are_executable_shaped() {
        // build-file token is ignored for run methods
        let entry = MethodEntry::new("Makefile runner", "./{}", MethodRole::Run);
        assert_eq!(entry.shape, TemplateShape::Executable);
        assert_eq!(
            MethodEntry::new("MPI with Slurm", "srun -n {} ./{}", MethodRole::Run).expected_arity(),
            Some(2)
        );
    }

    #[test]
    fn test_portable_source_arity() {
        let entry = MethodEntry::new("MPI Portable Source", "", MethodRole::Build);
        assert_eq!(entry.shape, TemplateShape::PortableSource);
        assert_eq!(entry.expected_arity(), Some(5));

        // portable source only exists as a multi-process build
        let entry = MethodEntry::new("Portable Source (No MPI)", "", MethodRole::Build);
        assert_eq!(entry.shape, TemplateShape::PortableSource);
        assert_eq!(entry.expected_arity(), None);
    }
}
