//! coilcad CLI - build coil geometries and inspect exported documents.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use coilcad::{build_coil_geometry, CoilParams, CoilShape, MarkerCube};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod stl;

#[derive(Parser)]
#[command(name = "coilcad")]
#[command(about = "Parametric coil geometries for finite-element simulation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a coil geometry and write its document
    Build {
        /// TOML parameter file; flags override its values
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Conductor model
        #[arg(long, value_enum)]
        shape: Option<ShapeArg>,
        /// Number of windings
        #[arg(short = 'n', long)]
        windings: Option<u32>,
        /// Wire radius in meters
        #[arg(long)]
        wire_radius: Option<f64>,
        /// Coil radius in meters
        #[arg(long)]
        coil_radius: Option<f64>,
        /// Marker cube center as X,Y,Z in meters
        #[arg(long, value_parser = parse_point)]
        marker: Option<[f64; 3]>,
        /// Output document (.json); printed to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Directory for one binary STL per region
        #[arg(long)]
        stl_dir: Option<PathBuf>,
    },
    /// Display information about a coilcad document
    Info {
        /// Path to the .json document
        file: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ShapeArg {
    Helical,
    Tubular,
}

impl From<ShapeArg> for CoilShape {
    fn from(shape: ShapeArg) -> Self {
        match shape {
            ShapeArg::Helical => CoilShape::Helical,
            ShapeArg::Tubular => CoilShape::Tubular,
        }
    }
}

fn parse_point(s: &str) -> Result<[f64; 3], String> {
    let coords = s
        .split(',')
        .map(|c| c.trim().parse::<f64>().map_err(|e| format!("{c:?}: {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    <[f64; 3]>::try_from(coords).map_err(|c| format!("expected X,Y,Z, got {} values", c.len()))
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn,coilcad=info".into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            config,
            shape,
            windings,
            wire_radius,
            coil_radius,
            marker,
            output,
            stl_dir,
        } => {
            let mut params = match &config {
                Some(path) => load_params(path)?,
                None => CoilParams::default(),
            };
            if let Some(shape) = shape {
                params.shape = shape.into();
            }
            if let Some(n) = windings {
                params.winding_count = n;
            }
            if let Some(r) = wire_radius {
                params.wire_radius = r;
            }
            if let Some(r) = coil_radius {
                params.coil_radius = r;
            }
            if let Some([x, y, z]) = marker {
                params.marker = Some(MarkerCube::at(x, y, z));
            }
            build(&params, output.as_deref(), stl_dir.as_deref())?;
        }
        Commands::Info { file } => {
            show_info(&file)?;
        }
    }

    Ok(())
}

fn load_params(path: &Path) -> Result<CoilParams> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    CoilParams::from_toml_str(&text).with_context(|| format!("in {}", path.display()))
}

fn build(params: &CoilParams, output: Option<&Path>, stl_dir: Option<&Path>) -> Result<()> {
    let (geo, cross_section) = build_coil_geometry(params).context("geometry construction failed")?;

    eprintln!(
        "{:?} coil: {} windings, height {:.6} m, air box {:.6} m",
        params.shape,
        params.winding_count,
        params.coil_height(),
        params.air_size()
    );
    for part in geo.parts() {
        eprintln!(
            "  {:<6} {:>14.6e} m³  ({} faces)",
            part.material().unwrap_or(&part.name),
            part.solid().volume(),
            part.solid().faces().count()
        );
    }
    eprintln!("  cross-section {cross_section:.6e} m²");

    let json = geo.to_document().to_json()?;
    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => println!("{json}"),
    }

    if let Some(dir) = stl_dir {
        fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
        for (label, mesh) in geo.region_meshes() {
            let path = dir.join(format!("{label}.stl"));
            fs::write(&path, stl::to_binary_stl(&mesh, &label)?)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), triangles = mesh.num_triangles(), "wrote STL");
        }
    }
    Ok(())
}

fn show_info(file: &Path) -> Result<()> {
    let json = fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let doc = coilcad_ir::Document::from_json(&json)?;

    println!("coilcad document: {}", file.display());
    println!("  Version: {}", doc.version);
    println!("  Nodes: {}", doc.nodes.len());
    println!("  Cross-section: {:.6e} m²", doc.cross_section);

    if !doc.regions.is_empty() {
        println!("\nRegions:");
        for (i, region) in doc.regions.iter().enumerate() {
            let group = region
                .solid_name
                .as_deref()
                .map(|s| format!(", solid {s}"))
                .unwrap_or_default();
            println!(
                "  {}: {} ({:.6e} m³{})",
                i + 1,
                region.material,
                region.volume,
                group
            );
        }
        println!("  Total volume: {:.6e} m³", doc.total_volume());
    }

    let names = doc.boundary_names();
    if !names.is_empty() {
        println!("\nBoundaries:");
        for name in names {
            let (count, area) = doc
                .boundaries
                .iter()
                .filter(|b| b.name.as_deref() == Some(name))
                .fold((0, 0.0), |(n, a), b| (n + 1, a + b.area));
            println!("  {name}: {count} face(s), {area:.6e} m²");
        }
    }

    let dangling = doc.dangling_references();
    if !dangling.is_empty() {
        println!("\nWarning: missing nodes {dangling:?}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("0.005, 0,-1e-3").unwrap(), [0.005, 0.0, -0.001]);
        assert!(parse_point("1,2").is_err());
        assert!(parse_point("1,2,x").is_err());
    }

    #[test]
    fn test_cli_parses_build_flags() {
        let cli = Cli::try_parse_from([
            "coilcad",
            "build",
            "--shape",
            "tubular",
            "-n",
            "4",
            "--marker",
            "0.005,0,0",
        ])
        .unwrap();
        let Commands::Build {
            shape,
            windings,
            marker,
            ..
        } = cli.command
        else {
            panic!("expected build");
        };
        assert!(matches!(shape, Some(ShapeArg::Tubular)));
        assert_eq!(windings, Some(4));
        assert_eq!(marker, Some([0.005, 0.0, 0.0]));
    }
}
