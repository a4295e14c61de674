//! Turning raw measurement bits into program results.
//!
//! The result trees found by the interpreter are walked once and compiled
//! into a closure. Applying that closure to a shot is then a matter of
//! reading bits, with no tree traversal.

use std::fmt;

use lanes_ir::Scalar;

use crate::error::{PostProcessError, PostProcessResult};
use crate::interpreter::{DetectorRecord, ObservableRecord};
use crate::value::MoveExecution;

/// A program's high-level return value for one shot.
#[derive(Debug, Clone, PartialEq)]
pub enum ReturnValue {
    /// No value: an empty site, a layout, or nothing returned.
    None,
    /// A measured bit or a boolean constant.
    Bool(bool),
    /// An integer constant.
    Int(i64),
    /// A floating-point constant.
    Float(f64),
    /// A list of values.
    List(Vec<ReturnValue>),
}

/// Everything extracted from one shot.
#[derive(Debug, Clone, PartialEq)]
pub struct ShotResult {
    /// The return value.
    pub value: ReturnValue,
    /// Detector parities, in declaration order.
    pub detectors: Vec<bool>,
    /// Observable parities, in declaration order.
    pub observables: Vec<bool>,
}

type Extractor = Box<dyn Fn(&[bool]) -> ReturnValue + Send + Sync>;
type ShotFn = Box<dyn Fn(&[bool]) -> ShotResult + Send + Sync>;

/// A compiled per-shot post-processing function.
///
/// Bit `i` of a shot is the measurement of qubit `i`.
pub struct PostProcessing {
    run: ShotFn,
    min_bits: usize,
    num_detectors: usize,
    num_observables: usize,
}

impl fmt::Debug for PostProcessing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostProcessing")
            .field("min_bits", &self.min_bits)
            .field("num_detectors", &self.num_detectors)
            .field("num_observables", &self.num_observables)
            .finish_non_exhaustive()
    }
}

impl PostProcessing {
    /// Compile the return value, detector and observable trees.
    ///
    /// Fails if any tree contains `Unknown`.
    pub fn compile(
        return_value: &MoveExecution,
        detectors: &[DetectorRecord],
        observables: &[ObservableRecord],
    ) -> PostProcessResult<Self> {
        let mut min_bits = 0;
        let value = compile_value(return_value, &mut min_bits)?;
        let detector_fns = detectors
            .iter()
            .map(|d| compile_parity(&d.measurements, "detector", &mut min_bits))
            .collect::<PostProcessResult<Vec<_>>>()?;
        let observable_fns = observables
            .iter()
            .map(|o| compile_parity(&o.measurements, "observable", &mut min_bits))
            .collect::<PostProcessResult<Vec<_>>>()?;

        let num_detectors = detector_fns.len();
        let num_observables = observable_fns.len();
        let run: ShotFn = Box::new(move |bits: &[bool]| ShotResult {
            value: value(bits),
            detectors: detector_fns.iter().map(|p| p.eval(bits)).collect(),
            observables: observable_fns.iter().map(|p| p.eval(bits)).collect(),
        });

        Ok(Self {
            run,
            min_bits,
            num_detectors,
            num_observables,
        })
    }

    /// Smallest shot length this function accepts.
    pub fn min_bits(&self) -> usize {
        self.min_bits
    }

    /// Number of detectors per shot.
    pub fn num_detectors(&self) -> usize {
        self.num_detectors
    }

    /// Number of observables per shot.
    pub fn num_observables(&self) -> usize {
        self.num_observables
    }

    /// Process one shot.
    pub fn apply(&self, bits: &[bool]) -> PostProcessResult<ShotResult> {
        if bits.len() < self.min_bits {
            return Err(PostProcessError::TooFewBits {
                expected: self.min_bits,
                got: bits.len(),
            });
        }
        Ok((self.run)(bits))
    }

    /// Process many shots with the same layout.
    pub fn apply_many<'a>(
        &self,
        shots: impl IntoIterator<Item = &'a [bool]>,
    ) -> PostProcessResult<Vec<ShotResult>> {
        shots.into_iter().map(|bits| self.apply(bits)).collect()
    }
}

fn compile_value(tree: &MoveExecution, min_bits: &mut usize) -> PostProcessResult<Extractor> {
    let extractor: Extractor = match tree {
        MoveExecution::Unknown => return Err(PostProcessError::UnknownValue("return value")),
        MoveExecution::MeasureResult(qubit) => {
            let bit = qubit.index();
            *min_bits = (*min_bits).max(bit + 1);
            Box::new(move |bits: &[bool]| {
                bits.get(bit)
                    .copied()
                    .map_or(ReturnValue::None, ReturnValue::Bool)
            })
        }
        MoveExecution::IListResult(items) => {
            let parts = items
                .iter()
                .map(|item| compile_value(item, min_bits))
                .collect::<PostProcessResult<Vec<_>>>()?;
            Box::new(move |bits: &[bool]| {
                ReturnValue::List(parts.iter().map(|part| part(bits)).collect())
            })
        }
        MoveExecution::Value(scalar) => {
            let constant = match *scalar {
                Scalar::Bool(b) => ReturnValue::Bool(b),
                Scalar::Int(i) => ReturnValue::Int(i),
                Scalar::Float(x) => ReturnValue::Float(x),
            };
            Box::new(move |_: &[bool]| constant.clone())
        }
        MoveExecution::Bottom | MoveExecution::AtomState(_) | MoveExecution::MeasureFuture(_) => {
            Box::new(|_: &[bool]| ReturnValue::None)
        }
    };
    Ok(extractor)
}

/// XOR of a fixed set of bits and a constant.
struct Parity {
    bits: Vec<usize>,
    constant: bool,
}

impl Parity {
    fn eval(&self, shot: &[bool]) -> bool {
        self.bits
            .iter()
            .fold(self.constant, |acc, &i| acc ^ shot.get(i).copied().unwrap_or(false))
    }
}

fn compile_parity(
    tree: &MoveExecution,
    what: &'static str,
    min_bits: &mut usize,
) -> PostProcessResult<Parity> {
    let mut parity = Parity {
        bits: Vec::new(),
        constant: false,
    };
    collect_parity(tree, what, &mut parity)?;
    if let Some(&max) = parity.bits.iter().max() {
        *min_bits = (*min_bits).max(max + 1);
    }
    Ok(parity)
}

fn collect_parity(
    tree: &MoveExecution,
    what: &'static str,
    parity: &mut Parity,
) -> PostProcessResult<()> {
    match tree {
        MoveExecution::Unknown => return Err(PostProcessError::UnknownValue(what)),
        MoveExecution::MeasureResult(qubit) => parity.bits.push(qubit.index()),
        MoveExecution::IListResult(items) => {
            for item in items {
                collect_parity(item, what, parity)?;
            }
        }
        MoveExecution::Value(Scalar::Bool(b)) => parity.constant ^= b,
        _ => {}
    }
    Ok(())
}
