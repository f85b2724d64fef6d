use extremal::families::PartThreshold;
use extremal::runner::{demo_suite, run_batch, RunConfig, RunOutcome, RunRequest};
use tracing_subscriber::EnvFilter;

#[derive(Default)]
struct Flags {
    family: Option<String>,
    n: Option<usize>,
    d: Option<usize>,
    k: Option<usize>,
    l: Option<usize>,
    s: Option<usize>,
    m: Option<usize>,
    n1: Option<usize>,
    n2: Option<usize>,
    parts: Option<Vec<usize>>,
    blocks: Option<Vec<PartThreshold>>,
    forbid: Option<usize>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut cfg = RunConfig::default();
    let mut flags = Flags::default();
    let mut requests: Vec<RunRequest> = Vec::new();
    let mut list_only = false;

    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--demo" => {
                requests.extend(demo_suite());
                i += 1;
            }
            "--list" => {
                list_only = true;
                i += 1;
            }
            "--family" => {
                flags.family = Some(arg_value(&args, i).clone());
                i += 2;
            }
            "--n" => {
                flags.n = Some(parse_value(&args, i));
                i += 2;
            }
            "--d" => {
                flags.d = Some(parse_value(&args, i));
                i += 2;
            }
            "--k" => {
                flags.k = Some(parse_value(&args, i));
                i += 2;
            }
            "--l" => {
                flags.l = Some(parse_value(&args, i));
                i += 2;
            }
            "--s" => {
                flags.s = Some(parse_value(&args, i));
                i += 2;
            }
            "--m" => {
                flags.m = Some(parse_value(&args, i));
                i += 2;
            }
            "--n1" => {
                flags.n1 = Some(parse_value(&args, i));
                i += 2;
            }
            "--n2" => {
                flags.n2 = Some(parse_value(&args, i));
                i += 2;
            }
            "--parts" => {
                let spec = arg_value(&args, i);
                flags.parts = Some(parse_sizes(spec).unwrap_or_else(|| usage_and_exit(2)));
                i += 2;
            }
            "--blocks" => {
                let spec = arg_value(&args, i);
                flags.blocks = Some(parse_blocks(spec).unwrap_or_else(|| usage_and_exit(2)));
                i += 2;
            }
            "--forbid" => {
                flags.forbid = Some(parse_value(&args, i));
                i += 2;
            }
            "--seed" => {
                cfg.solver.seed = parse_value(&args, i);
                i += 2;
            }
            "--warm-starts" => {
                cfg.solver.warm_starts = parse_value(&args, i);
                i += 2;
            }
            "--node-limit" => {
                cfg.solver.node_limit = parse_value(&args, i);
                i += 2;
            }
            "--max-objects" => {
                cfg.limits.max_objects = parse_value(&args, i);
                i += 2;
            }
            "--max-constraints" => {
                cfg.limits.max_constraints = parse_value(&args, i);
                i += 2;
            }
            "--help" | "-h" => usage_and_exit(0),
            _ => usage_and_exit(2),
        }
    }

    if list_only {
        list_families();
        return;
    }

    if flags.family.is_some() {
        requests.push(request_from_flags(&flags).unwrap_or_else(|| usage_and_exit(2)));
    }
    if requests.is_empty() {
        println!("No requests given; running the demo suite.");
        requests = demo_suite();
    }

    println!("extremal: {} request(s)", requests.len());
    println!("--------------------------------------------------");
    let reports = run_batch(&requests, &cfg);
    println!("--------------------------------------------------");

    let solved = reports
        .iter()
        .filter(|r| matches!(r.outcome, RunOutcome::Solved(_)))
        .count();
    let infeasible = reports
        .iter()
        .filter(|r| matches!(r.outcome, RunOutcome::Infeasible))
        .count();
    let failed = reports.len() - solved - infeasible;
    println!("{solved} solved, {infeasible} infeasible, {failed} failed");
    if failed > 0 {
        std::process::exit(1);
    }
}

fn arg_value(args: &[String], i: usize) -> &String {
    args.get(i + 1).unwrap_or_else(|| usage_and_exit(2))
}

fn parse_value<T: std::str::FromStr>(args: &[String], i: usize) -> T {
    arg_value(args, i)
        .parse()
        .unwrap_or_else(|_| usage_and_exit(2))
}

/// Comma-separated sizes: "4,4,4,4".
fn parse_sizes(spec: &str) -> Option<Vec<usize>> {
    let sizes: Vec<usize> = spec
        .split(',')
        .map(|p| p.trim().parse().ok())
        .collect::<Option<_>>()?;
    (!sizes.is_empty()).then_some(sizes)
}

/// Semicolon-separated parts, each "members:threshold": "0,1:1;2,3:1".
fn parse_blocks(spec: &str) -> Option<Vec<PartThreshold>> {
    let mut blocks = Vec::new();
    for part in spec.split(';') {
        let (members, threshold) = part.split_once(':')?;
        blocks.push(PartThreshold {
            members: parse_sizes(members)?,
            min_overlap: threshold.trim().parse().ok()?,
        });
    }
    (!blocks.is_empty()).then_some(blocks)
}

fn request_from_flags(f: &Flags) -> Option<RunRequest> {
    match f.family.as_deref()? {
        "antichain" => Some(RunRequest::Antichain { n: f.n? }),
        "diameter-antichain" => Some(RunRequest::AntichainWithDiameter { n: f.n?, d: f.d? }),
        "chain-free" => Some(RunRequest::ChainFree {
            n: f.n?,
            d: f.d?,
            l: f.l?,
        }),
        "uniform-diversity" => Some(RunRequest::UniformDiversity { n: f.n?, k: f.k? }),
        "powerset-diversity" => Some(RunRequest::PowersetDiversity { k: f.k? }),
        "two-part" => Some(RunRequest::TwoPart {
            n1: f.n1?,
            n2: f.n2?,
            k: f.k?,
            l: f.l?,
        }),
        "partition" => Some(RunRequest::Partition {
            n: f.n?,
            k: f.k?,
            parts: f.blocks.clone()?,
        }),
        "subset-regular" => Some(RunRequest::SubsetRegular {
            n: f.n?,
            k: f.k?,
            s: f.s?,
        }),
        "no-disjoint" => Some(RunRequest::NoDisjointGroup { n: f.n?, m: f.m? }),
        "triangles" => Some(RunRequest::MaxTriangles { n: f.n?, m: f.m? }),
        "kk3-free" => Some(RunRequest::MultipartiteKk3Free {
            part_sizes: f.parts.clone()?,
            k: f.forbid?,
        }),
        _ => None,
    }
}

fn list_families() {
    println!("Families and their flags:");
    println!("  antichain            --n N");
    println!("  diameter-antichain   --n N --d D");
    println!("  chain-free           --n N --d D --l L");
    println!("  uniform-diversity    --n N --k K");
    println!("  powerset-diversity   --k K");
    println!("  two-part             --n1 N1 --n2 N2 --k K --l L");
    println!("  partition            --n N --k K --blocks M,..:T;M,..:T");
    println!("  subset-regular       --n N --k K --s S");
    println!("  no-disjoint          --n N --m M");
    println!("  triangles            --n N --m M");
    println!("  kk3-free             --parts P,P,..  --forbid K");
}

fn usage_and_exit(code: i32) -> ! {
    eprintln!(
        "Usage:\n  extremal [--demo] [--family NAME <family flags>] [options]\n  extremal --list\n\nOptions:\n  --demo                   Run a small instance of every family\n  --family NAME            Solve one family instance (see --list for flags)\n  --seed SEED              Warm-start base seed (default: fixed)\n  --warm-starts N          Greedy warm-start attempts (default: 4)\n  --node-limit N           Exact-phase node budget (default: 100000000)\n  --max-objects N          Object budget per space (default: 1048576)\n  --max-constraints N      Constraint budget per model (default: 2000000)\n  --list                   List families and their flags\n"
    );
    std::process::exit(code)
}
