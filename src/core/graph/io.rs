//! Utilities for loading graphs from distance-matrix literals.

use std::hash::Hash;

use distances::Number;

use super::adjacency::AdjacencyGraph;
use super::{Graph, GraphError};

/// How the nodes of a matrix literal are derived.
#[derive(Debug, Clone)]
pub enum CsvHeader<N> {
    /// The first line holds the node labels, decoded cell by cell.
    Parsed(fn(&str) -> Result<N, GraphError>),
    /// There is no header line; nodes are derived from column indices and
    /// the first line already holds matrix content.
    Numbered(fn(usize) -> N),
    /// The caller supplies the nodes; the first line holds matrix content.
    Given(Vec<N>),
}

/// Decodes a weight cell of a numeric distance matrix.
///
/// Accepted literals are decimal integers, floats, booleans and `None`;
/// empty cells and `None` signify a missing edge.
///
/// Err:
///
/// * `InvalidArgument` for any other literal.
pub fn parse_weight_literal(cell: &str) -> Result<Option<f64>, GraphError> {
    let cell = cell.trim();
    match cell {
        "" | "None" => Ok(None),
        "True" | "true" => Ok(Some(1.0)),
        "False" | "false" => Ok(Some(0.0)),
        _ => cell.parse::<f64>().map(Some).map_err(|_| {
            GraphError::InvalidArgument(format!("unparsable matrix cell {cell:?}"))
        }),
    }
}

fn parse_label(cell: &str) -> Result<String, GraphError> {
    Ok(cell.trim().to_string())
}

fn column_index(index: usize) -> usize {
    index
}

fn nonzero<U: Number>(weight: &U) -> bool {
    *weight != U::zero()
}

/// Reads a rectangular matrix of distances into an [`AdjacencyGraph`].
///
/// The matrix is interpreted with the row as the origin and the column as
/// the destination of an edge. Cells whose parsed value fails the validity
/// predicate are dropped, as are weights above `max_distance` when a bound
/// is set. With `symmetric`, only the upper-right triangle of each row is
/// read and mirrored, and the diagonal is required but dropped as a
/// self-edge.
///
/// ```
/// use graph_dbscan::{CsvMatrixReader, Graph};
///
/// let literal = "a,b,c\n0,2,1\n2,0,3\n1,3,0";
/// let graph = CsvMatrixReader::labelled()
///     .symmetric(true)
///     .read(literal.lines())
///     .unwrap();
/// assert_eq!(graph.len(), 3);
/// assert_eq!(graph.edge(&"a".to_string(), &"b".to_string()), Ok(2.0));
/// ```
#[derive(Debug, Clone)]
pub struct CsvMatrixReader<N, U> {
    header: CsvHeader<N>,
    parse_weight: fn(&str) -> Result<Option<U>, GraphError>,
    valid_edge: fn(&U) -> bool,
    delimiter: char,
    max_distance: Option<U>,
    symmetric: bool,
}

impl CsvMatrixReader<String, f64> {
    /// A reader for comma-separated matrices whose first line labels the
    /// nodes.
    pub fn labelled() -> Self {
        Self::new(CsvHeader::Parsed(parse_label), parse_weight_literal)
    }
}

impl CsvMatrixReader<usize, f64> {
    /// A reader for headerless comma-separated matrices; nodes are numbered
    /// by column index.
    pub fn numbered() -> Self {
        Self::new(CsvHeader::Numbered(column_index), parse_weight_literal)
    }
}

impl<N, U> CsvMatrixReader<N, U>
where
    N: Eq + Hash + Clone,
    U: Number,
{
    /// Creates a reader with the given header mode and weight parser.
    ///
    /// The defaults follow the numeric matrix literal: comma-separated
    /// cells, falsy weights dropped, no distance bound, asymmetric.
    pub fn new(
        header: CsvHeader<N>,
        parse_weight: fn(&str) -> Result<Option<U>, GraphError>,
    ) -> Self {
        Self {
            header,
            parse_weight,
            valid_edge: nonzero,
            delimiter: ',',
            max_distance: None,
            symmetric: false,
        }
    }

    /// Sets the cell delimiter. A space selects the whitespace-aligned
    /// matrix-literal dialect, where runs of blanks separate cells.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets the predicate deciding whether a parsed weight is an edge.
    #[must_use]
    pub fn with_validity(mut self, valid_edge: fn(&U) -> bool) -> Self {
        self.valid_edge = valid_edge;
        self
    }

    /// Drops edges heavier than the given bound.
    #[must_use]
    pub fn with_max_distance(mut self, max_distance: U) -> Self {
        self.max_distance = Some(max_distance);
        self
    }

    /// Whether to mirror the upper-right triangle of the matrix.
    #[must_use]
    pub fn symmetric(mut self, symmetric: bool) -> Self {
        self.symmetric = symmetric;
        self
    }

    fn cells<'a>(&self, line: &'a str) -> Vec<&'a str> {
        if self.delimiter == ' ' {
            line.split_whitespace().collect()
        } else {
            line.split(self.delimiter).map(str::trim).collect()
        }
    }

    /// Reads the matrix from an iterable of lines.
    ///
    /// Err:
    ///
    /// * `InvalidArgument` for a missing header, ragged rows, more rows
    ///   than nodes, or unparsable cells.
    pub fn read<I, S>(&self, lines: I) -> Result<AdjacencyGraph<N, U>, GraphError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut rows = lines.into_iter();
        let mut pending: Option<S> = None;
        let nodes: Vec<N> = match &self.header {
            CsvHeader::Parsed(parse) => {
                let first = rows.next().ok_or_else(|| {
                    GraphError::InvalidArgument("matrix literal without a header line".to_string())
                })?;
                self.cells(first.as_ref())
                    .into_iter()
                    .map(parse)
                    .collect::<Result<_, _>>()?
            }
            CsvHeader::Numbered(node) => {
                let first = rows.next().ok_or_else(|| {
                    GraphError::InvalidArgument("empty matrix literal".to_string())
                })?;
                let count = self.cells(first.as_ref()).len();
                pending = Some(first);
                (0..count).map(node).collect()
            }
            CsvHeader::Given(nodes) => nodes.clone(),
        };

        let mut graph = if self.symmetric {
            AdjacencyGraph::new()
        } else {
            AdjacencyGraph::asymmetric()
        };
        for node in &nodes {
            graph.insert_node(node.clone());
        }

        let mut row_index = 0;
        for row in pending.into_iter().chain(rows) {
            let row = row.as_ref();
            if row.trim().is_empty() {
                continue;
            }
            if row_index >= nodes.len() {
                return Err(GraphError::InvalidArgument(
                    "matrix literal has more rows than nodes".to_string(),
                ));
            }
            let cells = self.cells(row);
            if self.symmetric {
                self.read_triangle_row(&mut graph, &nodes, row_index, &cells)?;
            } else {
                self.read_full_row(&mut graph, &nodes, row_index, &cells)?;
            }
            row_index += 1;
        }
        Ok(graph)
    }

    fn accepts(&self, weight: U) -> bool {
        (self.valid_edge)(&weight) && self.max_distance.map_or(true, |bound| weight <= bound)
    }

    fn read_full_row(
        &self,
        graph: &mut AdjacencyGraph<N, U>,
        nodes: &[N],
        row_index: usize,
        cells: &[&str],
    ) -> Result<(), GraphError> {
        if cells.len() != nodes.len() {
            return Err(GraphError::InvalidArgument(format!(
                "row {} has {} cells, expected {}",
                row_index,
                cells.len(),
                nodes.len()
            )));
        }
        for (column_index, cell) in cells.iter().enumerate() {
            if let Some(weight) = (self.parse_weight)(cell)? {
                if self.accepts(weight) {
                    graph.set_edge(
                        nodes[row_index].clone(),
                        nodes[column_index].clone(),
                        weight,
                    )?;
                }
            }
        }
        Ok(())
    }

    fn read_triangle_row(
        &self,
        graph: &mut AdjacencyGraph<N, U>,
        nodes: &[N],
        row_index: usize,
        cells: &[&str],
    ) -> Result<(), GraphError> {
        let expected = nodes.len() - row_index;
        if cells.len() < expected || cells.len() > nodes.len() {
            return Err(GraphError::InvalidArgument(format!(
                "row {} has {} cells, expected between {} and {}",
                row_index,
                cells.len(),
                expected,
                nodes.len()
            )));
        }
        // The trailing cells of the row are the columns row_index..n; the
        // first of them is the diagonal, which must parse but is dropped.
        let triangle = &cells[cells.len() - expected..];
        for (offset, cell) in triangle.iter().enumerate() {
            let column_index = row_index + offset;
            let weight = (self.parse_weight)(cell)?;
            if column_index == row_index {
                continue;
            }
            if let Some(weight) = weight {
                if self.accepts(weight) {
                    graph.set_edge(
                        nodes[row_index].clone(),
                        nodes[column_index].clone(),
                        weight,
                    )?;
                }
            }
        }
        Ok(())
    }
}
