//! Command-line or API options for preconditioners.
//!
//! `PcOptions` collects everything needed to build any preconditioner of the
//! crate from a PETSc-style argument list such as
//! `-pc_type ilu -pc_ilu_levels 2`. Values not given keep their defaults;
//! the relaxation factor defaults per type (SOR 0.7, SSOR 1.3).

use std::fmt;
use std::str::FromStr;

use crate::error::KError;

/// Preconditioner kind selected by `-pc_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PcType {
    None,
    Jacobi,
    GaussSeidel,
    Sor,
    Ssor,
    Ilu,
    Spai,
    Polynomial,
}

impl FromStr for PcType {
    type Err = KError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(PcType::None),
            "jacobi" => Ok(PcType::Jacobi),
            "gauss_seidel" | "gs" => Ok(PcType::GaussSeidel),
            "sor" => Ok(PcType::Sor),
            "ssor" => Ok(PcType::Ssor),
            "ilu" => Ok(PcType::Ilu),
            "spai" => Ok(PcType::Spai),
            "polynomial" | "poly" => Ok(PcType::Polynomial),
            other => Err(KError::InvalidOption(format!("unknown preconditioner type '{other}'"))),
        }
    }
}

impl fmt::Display for PcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PcType::None => "none",
            PcType::Jacobi => "jacobi",
            PcType::GaussSeidel => "gauss_seidel",
            PcType::Sor => "sor",
            PcType::Ssor => "ssor",
            PcType::Ilu => "ilu",
            PcType::Spai => "spai",
            PcType::Polynomial => "polynomial",
        };
        f.write_str(s)
    }
}

/// Preconditioner types & parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct PcOptions {
    /// `-pc_type`
    pub pc_type: PcType,
    /// `-pc_damping`: None, Jacobi and Gauss-Seidel scaling
    pub damping: f64,
    /// `-pc_omega`: relaxation factor ω for SOR/SSOR, type default when unset
    pub omega: Option<f64>,
    /// `-pc_ilu_levels`: fill level p of ILU(p)
    pub ilu_levels: usize,
    /// `-pc_spai_bandwidth`: half bandwidth of the initial SPAI support
    pub spai_bandwidth: usize,
    /// `-pc_spai_max_iter`
    pub spai_max_iter: usize,
    /// `-pc_spai_eps_res`
    pub spai_eps_res: f64,
    /// `-pc_spai_fill_in`
    pub spai_fill_in: usize,
    /// `-pc_spai_eps_res_comp`
    pub spai_eps_res_comp: f64,
    /// `-pc_spai_max_rho`
    pub spai_max_rho: f64,
    /// `-pc_spai_transpose`
    pub spai_transpose: bool,
    /// `-pc_poly_order`: Neumann series order m
    pub poly_order: usize,
    /// `-pc_poly_inner`: preconditioner wrapped by the polynomial
    pub poly_inner: PcType,
}

impl Default for PcOptions {
    fn default() -> Self {
        Self {
            pc_type: PcType::None,
            damping: 1.0,
            omega: None,
            ilu_levels: 0,
            spai_bandwidth: 0,
            spai_max_iter: 10,
            spai_eps_res: 1e-2,
            spai_fill_in: 10,
            spai_eps_res_comp: 1e-3,
            spai_max_rho: 1e-3,
            spai_transpose: false,
            poly_order: 1,
            poly_inner: PcType::Jacobi,
        }
    }
}

impl PcOptions {
    /// Parse `-key value` pairs. `-pc_spai_transpose` may stand alone.
    pub fn from_args<I, S>(args: I) -> Result<Self, KError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut opts = Self::default();
        let mut it = args.into_iter().peekable();
        while let Some(key) = it.next() {
            let key = key.as_ref();
            if key == "-pc_spai_transpose" {
                opts.spai_transpose = match it.peek().and_then(|v| parse_bool(v.as_ref())) {
                    Some(b) => {
                        it.next();
                        b
                    }
                    None => true,
                };
                continue;
            }
            let value = it
                .next()
                .ok_or_else(|| KError::InvalidOption(format!("missing value for '{key}'")))?;
            let value = value.as_ref();
            match key {
                "-pc_type" => opts.pc_type = value.parse()?,
                "-pc_damping" => opts.damping = parse_value(key, value)?,
                "-pc_omega" => opts.omega = Some(parse_value(key, value)?),
                "-pc_ilu_levels" => opts.ilu_levels = parse_value(key, value)?,
                "-pc_spai_bandwidth" => opts.spai_bandwidth = parse_value(key, value)?,
                "-pc_spai_max_iter" => opts.spai_max_iter = parse_value(key, value)?,
                "-pc_spai_eps_res" => opts.spai_eps_res = parse_value(key, value)?,
                "-pc_spai_fill_in" => opts.spai_fill_in = parse_value(key, value)?,
                "-pc_spai_eps_res_comp" => opts.spai_eps_res_comp = parse_value(key, value)?,
                "-pc_spai_max_rho" => opts.spai_max_rho = parse_value(key, value)?,
                "-pc_poly_order" => opts.poly_order = parse_value(key, value)?,
                "-pc_poly_inner" => opts.poly_inner = value.parse()?,
                _ => return Err(KError::InvalidOption(format!("unknown option '{key}'"))),
            }
        }
        Ok(opts)
    }
}

fn parse_value<V: FromStr>(key: &str, value: &str) -> Result<V, KError> {
    value
        .parse()
        .map_err(|_| KError::InvalidOption(format!("cannot parse '{value}' for '{key}'")))
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
