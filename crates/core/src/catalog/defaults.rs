//! Built-in method tables. Names are catalog keys and carry the classification
//! tokens, so they must not be reworded.

/// `(name, template)` pairs for build methods, in menu order
pub const DEFAULT_BUILD_METHODS: &[(&str, &str)] = &[
    ("Basic (No MPI)", "dslc {} -o {}"),
    ("Optimized (No MPI)", "dslc -O3 {} -o {}"),
    ("Debug (No MPI)", "dslc -g -O0 -Wall {} -o {}"),
    ("Makefile (No MPI)", "make {}"),
    ("MPI Manual", "dslc --mpi --nprocs={} {} -o {}"),
    ("MPI with Makefile", "make NPROCS={} {}"),
    (
        "MPI Portable Source",
        "dslc --mpi --nprocs={} --emit-portable {} && mpicc -DDSL_NPROCS={} -x c {} -o {}",
    ),
];

/// `(name, template)` pairs for run methods, in menu order
pub const DEFAULT_RUN_METHODS: &[(&str, &str)] = &[
    ("Basic (No MPI)", "./{}"),
    ("Valgrind (No MPI)", "valgrind --leak-check=full ./{}"),
    ("MPI", "mpirun -np {} ./{}"),
    ("MPI with Slurm", "srun -n {} ./{}"),
];
