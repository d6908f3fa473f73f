/// DTM reconstruction CLI: reads a noisy DSM, a trust mask, and an
/// initial guess, and writes a regularized reconstruction.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "dtm-solve", about = "Reconstruct a DTM from a noisy DSM by regularized optimization")]
struct Args {
    /// Input digital surface model (single-band raster).
    input_dsm: PathBuf,

    /// Trust mask raster (11 marks an excluded pixel).
    mask: PathBuf,

    /// Initial-guess raster, same dimensions as the DSM.
    init: PathBuf,

    /// Output path for the reconstructed DTM.
    output: PathBuf,

    /// Data-fidelity scale parameter.
    #[arg(default_value_t = 0.5)]
    sigma: f64,

    /// Regularization weight.
    #[arg(default_value_t = 0.02)]
    lambda: f64,

    /// No-data sentinel value in the input DSM.
    no_data: f64,

    /// Robust norm: huber, tukey, hubertukey, or L2.
    #[arg(default_value = "hubertukey")]
    norm: String,
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(1);
        }
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("dtm-solve: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let outcome = dtm_io::solve_from_paths(
        &args.input_dsm,
        &args.mask,
        &args.init,
        &args.output,
        args.no_data,
        &args.norm,
        args.sigma,
        args.lambda,
    )
    .with_context(|| format!("solving {}", args.input_dsm.display()))?;

    match outcome.status {
        dtm_core::SolveStatus::Converged { iterations } => {
            eprintln!("converged in {iterations} iterations, |grad|={:.3e}", outcome.final_gradient_norm);
        }
        dtm_core::SolveStatus::IterationCap { iterations } => {
            eprintln!(
                "hit the iteration cap ({iterations}) without converging, |grad|={:.3e}",
                outcome.final_gradient_norm
            );
        }
        dtm_core::SolveStatus::NumericalFailure { iterations } => {
            eprintln!("numerical failure after {iterations} iterations, returning best-so-far result");
        }
    }

    eprintln!("wrote {}", args.output.display());
    Ok(())
}
