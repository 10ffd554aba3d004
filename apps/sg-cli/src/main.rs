use clap::{Parser, Subcommand};
use nalgebra::Complex;
use sg_machine::{MachineParams, STATE_DIM, SynchronousMachine};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sg-cli")]
#[command(about = "Synchroflow CLI - synchronous generator operating points and swing runs", long_about = None)]
struct Cli {
    /// Machine parameter JSON file (defaults to the typical 100 MVA set)
    #[arg(long, global = true)]
    params: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the machine parameter dump
    Params,
    /// Solve a balanced steady-state operating point
    Steady {
        /// Active power (pu)
        #[arg(long)]
        p: f64,
        /// Reactive power (pu)
        #[arg(long)]
        q: f64,
        /// Terminal voltage magnitude (pu)
        #[arg(long, default_value_t = 1.0)]
        vm: f64,
        /// Terminal voltage angle (degrees)
        #[arg(long, default_value_t = 0.0)]
        va_deg: f64,
    },
    /// Run a mechanical-torque-step swing simulation
    ///
    /// The machine model only evaluates derivatives; the fixed-step RK4 loop
    /// that marches them in time lives here, in the caller.
    Swing {
        /// Initial active power (pu)
        #[arg(long)]
        p: f64,
        /// Initial reactive power (pu)
        #[arg(long)]
        q: f64,
        /// Terminal voltage magnitude (pu)
        #[arg(long, default_value_t = 1.0)]
        vm: f64,
        /// Mechanical torque step applied at t = 0 (pu)
        #[arg(long, default_value_t = 0.1)]
        tm_step: f64,
        /// End time (s)
        #[arg(long, default_value_t = 1.0)]
        t_end: f64,
        /// Time step (s)
        #[arg(long, default_value_t = 1e-3)]
        dt: f64,
        /// Record every N-th step (decimation)
        #[arg(long, default_value_t = 10)]
        record_every: usize,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let machine = load_machine(cli.params.as_deref())?;

    match cli.command {
        Commands::Params => {
            println!("{}", machine.params());
            Ok(())
        }
        Commands::Steady { p, q, vm, va_deg } => cmd_steady(&machine, p, q, vm, va_deg),
        Commands::Swing {
            p,
            q,
            vm,
            tm_step,
            t_end,
            dt,
            record_every,
            output,
        } => cmd_swing(
            &machine,
            &SwingOpts {
                p,
                q,
                vm,
                tm_step,
                t_end,
                dt,
                record_every,
                output,
            },
        ),
    }
}

/// Options for a swing run, mirroring the `swing` subcommand flags.
struct SwingOpts {
    p: f64,
    q: f64,
    vm: f64,
    tm_step: f64,
    t_end: f64,
    dt: f64,
    record_every: usize,
    output: Option<PathBuf>,
}

fn load_machine(path: Option<&Path>) -> Result<SynchronousMachine, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let file = File::open(path)?;
            let params: MachineParams = serde_json::from_reader(file)?;
            Ok(SynchronousMachine::new(params)?)
        }
        None => Ok(SynchronousMachine::with_typical_params()),
    }
}

fn cmd_steady(
    machine: &SynchronousMachine,
    p: f64,
    q: f64,
    vm: f64,
    va_deg: f64,
) -> Result<(), Box<dyn std::error::Error>> {
    let v = Complex::from_polar(vm, va_deg.to_radians());
    let sol = machine.steady_state(p, q, v)?;

    println!("{}", sol.operating_point);
    println!(
        "  v_abc            [{:.4}, {:.4}, {:.4}] pu",
        sol.v_abc.x, sol.v_abc.y, sol.v_abc.z
    );
    println!(
        "  i_abc            [{:.4}, {:.4}, {:.4}] pu",
        sol.i_abc.x, sol.i_abc.y, sol.i_abc.z
    );
    Ok(())
}

fn cmd_swing(
    machine: &SynchronousMachine,
    opts: &SwingOpts,
) -> Result<(), Box<dyn std::error::Error>> {
    if opts.dt <= 0.0 {
        return Err("dt must be positive".into());
    }
    if opts.t_end < 0.0 {
        return Err("t-end must be non-negative".into());
    }
    if opts.record_every == 0 {
        return Err("record-every must be positive".into());
    }

    let sol = machine.steady_state(opts.p, opts.q, Complex::new(opts.vm, 0.0))?;
    let op = &sol.operating_point;
    let v_abc = [sol.v_abc.x, sol.v_abc.y, sol.v_abc.z];
    let ef = op.field_voltage;

    let mut x = op.initial_state().to_array();
    let (_, te0) = machine.dynamics_flat(&x, &v_abc, 0.0, ef)?;
    let t_mech = te0 + opts.tm_step;
    tracing::info!(te0, t_mech, delta0 = op.rotor_angle, "swing run start");

    let mut writer: Box<dyn Write> = match &opts.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout()),
    };
    writeln!(writer, "t,delta,omega,te")?;
    writeln!(writer, "{:.6},{:.9},{:.9},{:.9}", 0.0, x[0], x[1], te0)?;

    let steps = (opts.t_end / opts.dt).ceil() as usize;
    for step in 1..=steps {
        x = rk4_step(machine, &x, &v_abc, t_mech, ef, opts.dt)?;
        if step % opts.record_every == 0 || step == steps {
            let (_, te) = machine.dynamics_flat(&x, &v_abc, t_mech, ef)?;
            let t = step as f64 * opts.dt;
            writeln!(writer, "{:.6},{:.9},{:.9},{:.9}", t, x[0], x[1], te)?;
        }
    }
    writer.flush()?;

    tracing::info!(steps, "swing run complete");
    Ok(())
}

/// Classical RK4 step over the flat state array.
fn rk4_step(
    machine: &SynchronousMachine,
    x: &[f64; STATE_DIM],
    v_abc: &[f64; 3],
    t_mech: f64,
    ef: f64,
    dt: f64,
) -> Result<[f64; STATE_DIM], Box<dyn std::error::Error>> {
    let (k1, _) = machine.dynamics_flat(x, v_abc, t_mech, ef)?;

    let mut x2 = *x;
    for i in 0..STATE_DIM {
        x2[i] = x[i] + 0.5 * dt * k1[i];
    }
    let (k2, _) = machine.dynamics_flat(&x2, v_abc, t_mech, ef)?;

    let mut x3 = *x;
    for i in 0..STATE_DIM {
        x3[i] = x[i] + 0.5 * dt * k2[i];
    }
    let (k3, _) = machine.dynamics_flat(&x3, v_abc, t_mech, ef)?;

    let mut x4 = *x;
    for i in 0..STATE_DIM {
        x4[i] = x[i] + dt * k3[i];
    }
    let (k4, _) = machine.dynamics_flat(&x4, v_abc, t_mech, ef)?;

    let mut out = *x;
    for i in 0..STATE_DIM {
        out[i] = x[i] + dt / 6.0 * (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]);
    }
    Ok(out)
}
