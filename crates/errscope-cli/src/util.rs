use std::{
    fs::File,
    io::{self, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use errscope_data::{ConditionSpec, Dataset};
use errscope_inspect::InspectionData;

/// Destination of a JSON report: a file, or stdout when no path is given.
#[derive(Debug)]
pub enum Output {
    Stdout(StdoutLock<'static>),
    File(BufWriter<File>, PathBuf),
}

impl Output {
    /// Writes `value` as pretty JSON to `output_path` (or stdout).
    pub fn save_json<T>(value: &T, output_path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = match output_path {
            Some(path) => {
                let file = File::create(&path)
                    .with_context(|| format!("Failed to create output file: {}", path.display()))?;
                Output::File(BufWriter::new(file), path)
            }
            None => Output::Stdout(io::stdout().lock()),
        };
        let target = output.target();
        serde_json::to_writer_pretty(&mut output, value)
            .with_context(|| format!("Failed to write JSON to {target}"))?;
        writeln!(output)
            .and_then(|()| output.flush())
            .with_context(|| format!("Failed to finish writing {target}"))?;
        tracing::info!(output = %target, "wrote report");
        Ok(())
    }

    fn target(&self) -> String {
        match self {
            Output::Stdout(_) => "stdout".to_owned(),
            Output::File(_, path) => path.display().to_string(),
        }
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout(writer) => writer.write(buf),
            Output::File(writer, _) => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout(writer) => writer.flush(),
            Output::File(writer, _) => writer.flush(),
        }
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Reads a feature matrix with its error labels:
/// `{"matrix": [[..], ..], "is_error": [..]}`.
pub fn read_dataset_file<P>(path: P) -> anyhow::Result<Dataset>
where
    P: AsRef<Path>,
{
    let dataset: Dataset = read_json_file("dataset", path)?;
    tracing::info!(
        rows = dataset.num_rows(),
        columns = dataset.matrix().num_cols(),
        "loaded dataset"
    );
    Ok(dataset)
}

/// Reads an importance vector: a JSON array with one score per column.
pub fn read_importance_file<P>(path: P) -> anyhow::Result<Vec<f64>>
where
    P: AsRef<Path>,
{
    read_json_file("importance", path)
}

pub fn read_inspection_data_file<P>(path: P) -> anyhow::Result<InspectionData>
where
    P: AsRef<Path>,
{
    let data: InspectionData = read_json_file("inspection data", path)?;
    tracing::info!(
        rows = data.num_rows(),
        columns = data.columns().num_cols(),
        "loaded inspection data"
    );
    Ok(data)
}

/// Reads a rule: a JSON array of conditions.
pub fn read_rule_file<P>(path: P) -> anyhow::Result<Vec<ConditionSpec>>
where
    P: AsRef<Path>,
{
    read_json_file("rule", path)
}
