//! Packs the published area-light tables into the viewer's resource files.
//!
//! Reads a C/C++ header holding `mat_ltc_1`, `mat_ltc_2` and `mat_ltc_sheen`
//! and writes each as a little-endian `f32` file the viewer loads at startup.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use sheen_viewer::gfx::resources::ltc::{parse_c_array, LtcTable, LtcTableKind};

#[derive(Parser, Debug)]
#[command(name = "ltc-pack", about = "Convert LTC header arrays into binary table files")]
struct Args {
    /// Header containing the fitted arrays
    header: PathBuf,
    /// Directory the table files are written to
    #[arg(default_value = "assets/ltc")]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let source = std::fs::read_to_string(&args.header)
        .with_context(|| format!("reading {}", args.header.display()))?;
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;

    for kind in LtcTableKind::ALL {
        let data = parse_c_array(&source, kind.header_array())?;
        let table = LtcTable::from_f32(kind, data)?;

        let path = args.out_dir.join(kind.file_name());
        std::fs::write(&path, table.to_le_bytes())
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!(
            "Wrote {} ({}x{}, {} channels)",
            path.display(),
            kind.size(),
            kind.size(),
            kind.channels()
        );
    }

    Ok(())
}
