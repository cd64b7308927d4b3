//! # Result Writers
//!
//! Tab-separated call output and an optional posterior-matrix dump. Paths
//! ending in `.gz` are gzip-compressed; no path means stdout.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::data::Markers;
use crate::error::Result;
use crate::model::{ImputedCall, Posterior};

fn create_sink(path: Option<&Path>) -> Result<Box<dyn Write + Send>> {
    let Some(path) = path else {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    };
    let file = File::create(path)?;
    let is_gzipped = path.extension().map(|e| e == "gz").unwrap_or(false);
    let writer: Box<dyn Write + Send> = if is_gzipped {
        Box::new(BufWriter::new(GzEncoder::new(file, Compression::default())))
    } else {
        Box::new(BufWriter::new(file))
    };
    Ok(writer)
}

/// One line per (haplotype, SNP): `hap_id snp_id chrom bp allele imputed prob`
pub struct CallWriter {
    writer: Box<dyn Write + Send>,
}

impl CallWriter {
    pub fn create(path: Option<&Path>) -> Result<Self> {
        Self::from_writer(create_sink(path)?)
    }

    /// Wrap any writer and emit the header line
    pub fn from_writer(mut writer: Box<dyn Write + Send>) -> Result<Self> {
        writeln!(writer, "hap_id\tsnp_id\tchrom\tbp\tallele\timputed\tprob")?;
        Ok(Self { writer })
    }

    pub fn write_haplotype(
        &mut self,
        hap_id: &str,
        markers: &Markers,
        calls: &[ImputedCall],
    ) -> Result<()> {
        for (snp, call) in markers.iter().zip(calls) {
            writeln!(
                self.writer,
                "{}\t{}\t{}\t{}\t{}\t{}\t{:.6}",
                hap_id,
                snp.id,
                snp.chrom,
                snp.bp,
                call.allele,
                u8::from(call.imputed),
                call.prob
            )?;
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Posterior matrix in probability space, one column per reference haplotype:
/// `hap_id snp_index p_0 .. p_{n-1}`
pub struct PosteriorWriter {
    writer: Box<dyn Write + Send>,
}

impl PosteriorWriter {
    pub fn create(path: &Path, ref_hap_ids: &[String]) -> Result<Self> {
        Self::from_writer(create_sink(Some(path))?, ref_hap_ids)
    }

    pub fn from_writer(mut writer: Box<dyn Write + Send>, ref_hap_ids: &[String]) -> Result<Self> {
        write!(writer, "hap_id\tsnp_index")?;
        for id in ref_hap_ids {
            write!(writer, "\t{id}")?;
        }
        writeln!(writer)?;
        Ok(Self { writer })
    }

    pub fn write_posterior(&mut self, hap_id: &str, posterior: &Posterior) -> Result<()> {
        for i in 0..posterior.n_snps() {
            write!(self.writer, "{hap_id}\t{i}")?;
            for &lp in posterior.row(i) {
                write!(self.writer, "\t{:.6e}", lp.exp())?;
            }
            writeln!(self.writer)?;
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
