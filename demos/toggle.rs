//! Symbolic model checking of an n-bit counter.
//!
//! Every step toggles bit 0 and carries into the higher bits, so the system
//! cycles through all 2^n states. The demo checks a few CTL properties and
//! reports engine statistics.
//!
//! ```bash
//! cargo run --example toggle -- 6 --order interleaved
//! ```

use clap::{Parser, ValueEnum};
use log::info;

use mtbdd_rs::ctl::{CtlChecker, CtlFormula, TransitionRelation};
use mtbdd_rs::mtbdd::Mtbdd;
use mtbdd_rs::reference::Ref;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Order {
    /// x0, x0', x1, x1', ...
    Interleaved,
    /// x0, x1, ..., x0', x1', ...
    Blocked,
}

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Number of bits.
    #[arg(value_name = "INT", default_value = "4")]
    bits: usize,

    /// Variable order.
    #[clap(long, value_enum, default_value = "interleaved")]
    order: Order,

    /// Switch to the other variable order after building the relation.
    #[clap(long)]
    reorder: bool,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = std::time::Instant::now();

    let args = Cli::parse();
    println!("args = {:?}", args);

    let n = args.bits;
    let current: Vec<String> = (0..n).map(|i| format!("x{}", i)).collect();
    let next: Vec<String> = (0..n).map(|i| format!("x{}_next", i)).collect();
    let interleaved: Vec<String> = current.iter().zip(&next).flat_map(|(c, x)| [c.clone(), x.clone()]).collect();
    let blocked: Vec<String> = current.iter().chain(&next).cloned().collect();

    let mtbdd = Mtbdd::default();
    match args.order {
        Order::Interleaved => mtbdd.declare(&interleaved),
        Order::Blocked => mtbdd.declare(&blocked),
    }

    let xs = current.iter().map(|v| mtbdd.var(v)).collect::<Result<Vec<_>, _>>()?;
    let ys = next.iter().map(|v| mtbdd.var(v)).collect::<Result<Vec<_>, _>>()?;

    // x_i' <-> x_i ^ (x_0 & ... & x_{i-1})
    let mut carry = Ref::TRUE;
    let mut transition = Ref::TRUE;
    for (&x, &y) in xs.iter().zip(&ys) {
        let bit = mtbdd.equiv(y, mtbdd.xor(x, carry));
        transition = mtbdd.and(transition, bit);
        carry = mtbdd.and(carry, x);
    }
    println!("transition relation: {} nodes", mtbdd.size(transition));

    if args.reorder {
        let other = match args.order {
            Order::Interleaved => &blocked,
            Order::Blocked => &interleaved,
        };
        mtbdd.set_order(other)?;
        println!("after reorder: {} nodes", mtbdd.size(transition));
    }

    let zero = mtbdd.and_many(xs.iter().map(|&x| mtbdd.not(x)));
    let full = mtbdd.and_many(xs.iter().copied());

    let relation = TransitionRelation::new(&mtbdd, transition, current.clone(), next.clone())?;
    let reachable = mtbdd.reachable(zero, &relation)?;
    println!("reachable states: {}", mtbdd.count_sat(reachable));

    let mut checker = CtlChecker::new(&mtbdd, relation, zero);
    checker.add_label("zero", zero);
    checker.add_label("full", full);

    let properties = [
        CtlFormula::atom("full").ef(),
        CtlFormula::atom("zero").ef().ag(),
        CtlFormula::atom("full").ax(),
        CtlFormula::atom("zero").not().eu(CtlFormula::atom("full")),
    ];
    for formula in &properties {
        let holds = checker.holds_initially(formula)?;
        println!("{:<40} {}", formula.to_string(), holds);
    }

    info!("{}", mtbdd.stats());
    mtbdd.garbage_collect(&[transition, reachable]);
    println!("after gc: {}", mtbdd.stats());

    println!("\nAll done in {:.3} s", time_total.elapsed().as_secs_f64());
    Ok(())
}
