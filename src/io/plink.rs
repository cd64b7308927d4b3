//! # PLINK Text Reading
//!
//! Loads a `<prefix>.map` / `<prefix>.ped` pair into a [`Genome`].
//!
//! ## Formats
//! ```text
//! .map   chrom  snp_id  position_cM  position_bp
//! .ped   FID  IID  PAT  MAT  SEX  PHENO  a1 a2  a1 a2  ...   (one pair per .map row)
//! ```
//! Each individual `FID IID` becomes two haplotypes, `FID_IID_1` (first
//! allele of every pair) and `FID_IID_2` (second allele). SNPs are reordered
//! into (chromosome, bp) order; `.ped` columns follow the `.map` file order.
//! A gzip-compressed `<prefix>.ped.gz` is used when the plain file is absent.

use std::collections::HashSet;
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;
use tracing::{debug, info, info_span};

use crate::data::marker::{parse_chrom, Markers, SnpMeta};
use crate::data::{Allele, Genome, Samples};
use crate::error::{LsError, Result};

/// Columns preceding the genotype pairs on every `.ped` line
const PED_HEADER_COLS: usize = 6;

/// `<prefix><ext>` without touching any existing extension of `prefix`
fn with_suffix(prefix: &Path, ext: &str) -> PathBuf {
    let mut s: OsString = prefix.as_os_str().to_owned();
    s.push(ext);
    PathBuf::from(s)
}

/// Open a text file, transparently decompressing `.gz`
pub fn open_text(path: &Path) -> Result<Box<dyn BufRead + Send>> {
    if !path.exists() {
        return Err(LsError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let file = File::open(path)?;
    let is_gzipped = path.extension().map(|e| e == "gz").unwrap_or(false);
    let reader: Box<dyn BufRead + Send> = if is_gzipped {
        Box::new(BufReader::new(MultiGzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok(reader)
}

/// Paths of the `.map` and `.ped` files for a prefix
pub fn resolve_prefix(prefix: &Path) -> Result<(PathBuf, PathBuf)> {
    let map = with_suffix(prefix, ".map");
    if !map.exists() {
        return Err(LsError::FileNotFound { path: map });
    }
    let ped = with_suffix(prefix, ".ped");
    if ped.exists() {
        return Ok((map, ped));
    }
    let ped_gz = with_suffix(prefix, ".ped.gz");
    if ped_gz.exists() {
        return Ok((map, ped_gz));
    }
    Err(LsError::FileNotFound { path: ped })
}

/// Load a PLINK file pair by prefix (`data/02` reads `data/02.map` and `data/02.ped`)
pub fn read_genome(prefix: &Path) -> Result<Genome> {
    info_span!("plink_read", prefix = ?prefix).in_scope(|| {
        let (map_path, ped_path) = resolve_prefix(prefix)?;
        let map_name = map_path.display().to_string();
        let ped_name = ped_path.display().to_string();

        let markers = read_map(open_text(&map_path)?, &map_name)?;
        let genome = read_ped(open_text(&ped_path)?, &ped_name, markers)?;
        info!(
            individuals = genome.n_individuals(),
            snps = genome.n_snps(),
            "Loaded {}",
            prefix.display()
        );
        Ok(genome)
    })
}

/// Parse `.map` rows into sorted markers
pub fn read_map(reader: Box<dyn BufRead + Send>, file: &str) -> Result<Markers> {
    let mut snps = Vec::new();
    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let lineno = line_num + 1;

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(LsError::parse(
                file,
                lineno,
                format!("expected 4 columns, got {}", parts.len()),
            ));
        }

        let chrom = parse_chrom(parts[0]).ok_or_else(|| {
            LsError::parse(file, lineno, format!("invalid chromosome '{}'", parts[0]))
        })?;
        let gen_pos: f64 = parts[2]
            .parse()
            .map_err(|_| LsError::parse(file, lineno, "invalid genetic position"))?;
        if !gen_pos.is_finite() {
            return Err(LsError::parse(file, lineno, "genetic position is not finite"));
        }
        let bp: u32 = parts[3]
            .parse()
            .map_err(|_| LsError::parse(file, lineno, "invalid base-pair position"))?;

        snps.push(SnpMeta::new(chrom, parts[1], gen_pos, bp));
    }
    debug!(snps = snps.len(), file, "parsed map");
    Markers::from_file_order(snps)
}

/// Parse `.ped` rows against already-loaded markers
pub fn read_ped(reader: Box<dyn BufRead + Send>, file: &str, markers: Markers) -> Result<Genome> {
    let n_snp = markers.len();
    let expected_cols = PED_HEADER_COLS + 2 * n_snp;

    let mut ids = Vec::new();
    let mut seen = HashSet::new();
    let mut calls: Vec<Option<Allele>> = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let lineno = line_num + 1;

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() != expected_cols {
            return Err(LsError::parse(
                file,
                lineno,
                format!(
                    "expected {} columns ({} SNPs), got {}",
                    expected_cols,
                    n_snp,
                    parts.len()
                ),
            ));
        }

        let id = format!("{}_{}", parts[0], parts[1]);
        if !seen.insert(id.clone()) {
            return Err(LsError::parse(file, lineno, format!("duplicate individual {id}")));
        }

        let mut hap1 = vec![None; n_snp];
        let mut hap2 = vec![None; n_snp];
        for (row, pair) in parts[PED_HEADER_COLS..].chunks_exact(2).enumerate() {
            let snp = markers.sorted_index_of_row(row).ok_or_else(|| {
                LsError::parse(file, lineno, format!("no map row for genotype column {row}"))
            })?;
            let parse = |tok: &str| {
                Allele::parse_call(tok).map_err(|bad| {
                    LsError::parse(file, lineno, format!("invalid allele '{bad}'"))
                })
            };
            hap1[snp] = parse(pair[0])?;
            hap2[snp] = parse(pair[1])?;
        }

        calls.extend(hap1);
        calls.extend(hap2);
        ids.push(id);
    }
    debug!(individuals = ids.len(), file, "parsed ped");
    Genome::new(markers, Samples::from_ids(ids), calls)
}
