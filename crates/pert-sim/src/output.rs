//! Output emission (spec.md §6): the `singleIteration` per-iteration TSV
//! writer and the `iterationMatrix` in-memory accumulator, grounded in
//! `original_source/src/utils/utilities.cxx`'s `saveNodeValuesWithTimeSimple`
//! and `saveOutputMatrix`.
//!
//! The original's `"nodes in the graph"` type label is normalised here to
//! `real`, and the `nodeID` column — populated from an external node
//! description file in the original, a feature explicitly out of scope — is
//! the node's augmented-graph index instead.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use pert_graph::{VirtualDirection, VirtualNodeName, WeightedEdgeGraph};

use crate::error::{SimError, SimResult};

/// Where the three emittable outputs land: one sink per run.
pub trait OutputSink {
    /// Record one agent's full augmented state at one `(outer, inner)` step.
    fn emit(
        &mut self,
        type_name: &str,
        names: &[String],
        values: &[f64],
        flat_iteration: u64,
        time: f64,
    ) -> SimResult<()>;

    /// Flush any buffered state. Called once after the run completes.
    fn finish(&mut self) -> SimResult<()> {
        Ok(())
    }
}

fn node_kind(name: &str) -> (&'static str, String) {
    match VirtualNodeName::parse(name) {
        Ok(vn) if vn.direction == VirtualDirection::In => ("virtual-input", vn.peer_type),
        Ok(vn) => ("virtual-output", vn.peer_type),
        Err(_) => ("real", name.to_string()),
    }
}

/// Writes `<dir>/<type>--<flatIteration>.tsv` on every `emit` call, header
/// `nodeID\tnodeName\ttype\talias\tnodeValue\ttime`.
pub struct SingleIterationSink {
    dir: PathBuf,
}

impl SingleIterationSink {
    pub fn new(dir: impl Into<PathBuf>) -> SimResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }
}

impl OutputSink for SingleIterationSink {
    fn emit(&mut self, type_name: &str, names: &[String], values: &[f64], flat_iteration: u64, time: f64) -> SimResult<()> {
        let path = self.dir.join(format!("{type_name}--{flat_iteration}.tsv"));
        let mut file = File::create(&path)?;
        writeln!(file, "nodeID\tnodeName\ttype\talias\tnodeValue\ttime")?;
        for (id, (name, value)) in names.iter().zip(values).enumerate() {
            let (kind, alias) = node_kind(name);
            writeln!(file, "{id}\t{name}\t{kind}\t{alias}\t{value}\t{time}")?;
        }
        Ok(())
    }
}

/// Accumulates every `emit`'d column in memory and writes one
/// `<dir>/<type>.tsv` matrix per type at [`OutputSink::finish`], header
/// `nodeNames\t<t0>\t<t1>\t...`, body `nodeName\t<values...>`.
#[derive(Default)]
pub struct IterationMatrixSink {
    dir: PathBuf,
    by_type: FxHashMap<String, TypeAccumulator>,
}

#[derive(Default)]
struct TypeAccumulator {
    names: Vec<String>,
    times: Vec<f64>,
    columns: Vec<Vec<f64>>,
}

impl IterationMatrixSink {
    pub fn new(dir: impl Into<PathBuf>) -> SimResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, by_type: FxHashMap::default() })
    }
}

impl OutputSink for IterationMatrixSink {
    fn emit(&mut self, type_name: &str, names: &[String], values: &[f64], _flat_iteration: u64, time: f64) -> SimResult<()> {
        let acc = self.by_type.entry(type_name.to_string()).or_insert_with(|| TypeAccumulator {
            names: names.to_vec(),
            times: Vec::new(),
            columns: Vec::new(),
        });
        acc.times.push(time);
        acc.columns.push(values.to_vec());
        Ok(())
    }

    fn finish(&mut self) -> SimResult<()> {
        for (type_name, acc) in &self.by_type {
            let path = self.dir.join(format!("{type_name}.tsv"));
            let mut file = File::create(&path)?;
            write!(file, "nodeNames")?;
            for t in &acc.times {
                write!(file, "\t{t}")?;
            }
            writeln!(file)?;

            for (row, name) in acc.names.iter().enumerate() {
                write!(file, "{name}")?;
                for column in &acc.columns {
                    write!(file, "\t{}", column[row])?;
                }
                writeln!(file)?;
            }
        }
        Ok(())
    }
}

/// A no-op sink for runs (and tests) that don't care about emitted output.
#[derive(Default)]
pub struct NullSink;

impl OutputSink for NullSink {
    fn emit(&mut self, _type_name: &str, _names: &[String], _values: &[f64], _flat_iteration: u64, _time: f64) -> SimResult<()> {
        Ok(())
    }
}

/// Dumps one agent type's augmented graph edge list to
/// `<dir>/augmentedGraphs/<type>.tsv`, header `source\ttarget\tweight`. Not
/// part of the per-iteration output loop — called once per local agent at
/// scheduler startup, for run diagnostics and reproducibility.
pub fn write_augmented_graph(dir: &Path, type_name: &str, graph: &WeightedEdgeGraph) -> SimResult<()> {
    let dir = dir.join("augmentedGraphs");
    fs::create_dir_all(&dir)?;
    let path = dir.join(format!("{type_name}.tsv"));
    let mut file = File::create(&path).map_err(SimError::Output)?;
    writeln!(file, "source\ttarget\tweight")?;
    for (src, dst, weight) in graph.edges() {
        let src_name = graph.name_of(*src).map_err(|e| SimError::Agent {
            type_name: type_name.to_string(),
            source: pert_agent::AgentError::Graph(e),
        })?;
        let dst_name = graph.name_of(*dst).map_err(|e| SimError::Agent {
            type_name: type_name.to_string(),
            source: pert_agent::AgentError::Graph(e),
        })?;
        writeln!(file, "{src_name}\t{dst_name}\t{weight}")?;
    }
    Ok(())
}
