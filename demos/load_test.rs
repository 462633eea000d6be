//! ```bash
//! RUSTFLAGS="-C target-cpu=native" cargo run --example load_test --release
//! ```

use lockred::{
    compute_pairings, compute_pairings_anti_transpose, compute_pairings_lock_free,
    compute_pairings_with_reps, PersistenceDiagram, ReductionOptions,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::{
    collections::HashMap,
    fs,
    io::{BufReader, BufWriter},
    path::PathBuf,
    time::Instant,
};

/// Vertex count of the generated complex.
const N_VERTICES: usize = 120;
/// Independent edge probability of the random flag complex.
const EDGE_PROB: f64 = 0.15;
/// Deterministic seed for reproducibility.
const SEED: u64 = 42;

/// Annotated boundary matrix of a random flag complex: vertices, then
/// random edges, then every triangle closed by the chosen edges.
fn random_flag_complex(n_vertices: usize, edge_prob: f64, seed: u64) -> Vec<(usize, Vec<usize>)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut matrix: Vec<(usize, Vec<usize>)> =
        (0..n_vertices).map(|_| (0, Vec::new())).collect();

    let mut edge_column: HashMap<(usize, usize), usize> = HashMap::new();
    for a in 0..n_vertices {
        for b in (a + 1)..n_vertices {
            if rng.gen_bool(edge_prob) {
                edge_column.insert((a, b), matrix.len());
                matrix.push((1, vec![a, b]));
            }
        }
    }
    for a in 0..n_vertices {
        for b in (a + 1)..n_vertices {
            for c in (b + 1)..n_vertices {
                let (Some(&ab), Some(&ac), Some(&bc)) = (
                    edge_column.get(&(a, b)),
                    edge_column.get(&(a, c)),
                    edge_column.get(&(b, c)),
                ) else {
                    continue;
                };
                let mut boundary = vec![ab, ac, bc];
                boundary.sort_unstable();
                matrix.push((2, boundary));
            }
        }
    }
    matrix
}

fn divider() {
    println!("{}", "─".repeat(60));
}

fn main() -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║        lockred Load Test & Engine Agreement Check        ║");
    println!("╚══════════════════════════════════════════════════════════╝");
    println!();

    // ── Phase 1: Input Generation ────────────────────────────────────────────
    divider();
    println!("Phase 1 — Generating a random flag complex");

    let t0 = Instant::now();
    let matrix = random_flag_complex(N_VERTICES, EDGE_PROB, SEED);
    let n = matrix.len();
    let edges = matrix.iter().filter(|(d, _)| *d == 1).count();
    let triangles = matrix.iter().filter(|(d, _)| *d == 2).count();
    println!("  Vertices:  {N_VERTICES}");
    println!("  Edges:     {edges}");
    println!("  Triangles: {triangles}");
    println!("  Columns:   {n}");
    println!("  Generated in {:?}", t0.elapsed());

    // ── Phase 2: Serial Reduction ────────────────────────────────────────────
    divider();
    println!("Phase 2 — Serial reduction (primal matrix)");

    let serial_options = ReductionOptions::default().with_num_threads(1);
    let t0 = Instant::now();
    let serial = compute_pairings_lock_free(matrix.clone(), &serial_options)?;
    let serial_duration = t0.elapsed();
    println!("  Pairs:     {}", serial.paired.len());
    println!("  Essential: {}", serial.unpaired.len());
    println!("  Reduced in {serial_duration:?}");

    // ── Phase 3: Lock-Free Reduction ─────────────────────────────────────────
    divider();
    println!("Phase 3 — Lock-free reduction across thread counts");

    let mut lock_free_duration = serial_duration;
    for threads in [2usize, 4, 8] {
        let options = ReductionOptions::default().with_num_threads(threads);
        let t0 = Instant::now();
        let diagram = compute_pairings_lock_free(matrix.clone(), &options)?;
        let duration = t0.elapsed();
        let agrees = diagram == serial;
        println!(
            "  {threads} threads: {duration:?}  (agrees with serial: {})",
            if agrees { "yes" } else { "NO" }
        );
        anyhow::ensure!(agrees, "lock-free diagram diverged at {threads} threads");
        lock_free_duration = duration;
    }

    // ── Phase 4: Anti-Transposed Reduction ───────────────────────────────────
    divider();
    println!("Phase 4 — Anti-transposed (cohomology) reduction");

    let options = ReductionOptions::default();
    let t0 = Instant::now();
    let dual = compute_pairings_anti_transpose(matrix.clone(), &options)?;
    let dual_duration = t0.elapsed();
    println!("  Reduced in {dual_duration:?}");
    anyhow::ensure!(dual == serial, "anti-transposed diagram diverged");
    println!("  Agrees with serial: yes");

    let t0 = Instant::now();
    let default_policy = compute_pairings(matrix.clone(), &options)?;
    println!(
        "  Default policy (annotated input → dual): {:?}",
        t0.elapsed()
    );
    anyhow::ensure!(default_policy == serial, "default-policy diagram diverged");

    // ── Phase 5: Representatives ─────────────────────────────────────────────
    divider();
    println!("Phase 5 — Reduction with representatives (R = D·V)");

    let reps_options = ReductionOptions::default().with_maintain_v(true);
    let t0 = Instant::now();
    let with_reps = compute_pairings_with_reps(matrix.clone(), &reps_options)?;
    println!("  Reduced in {:?}", t0.elapsed());
    anyhow::ensure!(
        with_reps.diagram() == serial,
        "with-reps diagram diverged"
    );
    if let (Some(&(birth, death)), Some(rep)) =
        (with_reps.paired.first(), with_reps.paired_reps.first())
    {
        println!(
            "  First pair ({birth}, {death}) is killed by a sum of {} input columns",
            rep.len()
        );
    }

    // ── Phase 6: Diagram Persistence ─────────────────────────────────────────
    divider();
    println!("Phase 6 — Saving and reloading the diagram (bincode)");

    let tmp_path = PathBuf::from("/tmp/lockred_load_test.bin");
    let t0 = Instant::now();
    {
        let file = fs::File::create(&tmp_path)?;
        serial.save(BufWriter::new(file))?;
    }
    let file_size = fs::metadata(&tmp_path)?.len();
    println!("  Saved {} bytes in {:?}", file_size, t0.elapsed());

    let loaded = {
        let file = fs::File::open(&tmp_path)?;
        PersistenceDiagram::load(BufReader::new(file))?
    };
    anyhow::ensure!(loaded == serial, "diagram changed across save/load");
    println!("  Round-trip integrity: ok");

    // ── Phase 7: Summary ─────────────────────────────────────────────────────
    divider();
    println!("Performance Summary");
    println!("──────────────────────────────────────────────────");
    println!("  Columns reduced:        {n}");
    println!("  Serial:                 {serial_duration:?}");
    println!("  Lock-free (8 threads):  {lock_free_duration:?}");
    println!("  Anti-transposed:        {dual_duration:?}");
    println!("──────────────────────────────────────────────────");
    println!();
    println!("✅ All engines agree");

    let _ = fs::remove_file(&tmp_path);
    Ok(())
}
