//! the whitespace-token text backend
//!
//! Array data is stored as whitespace-delimited tokens beginning at the
//! 1-based line number named by the data source's `location`. Slabs are
//! addressed in row-major order over the raw array: a read skips the head
//! tokens before the requested window on each dimension and the tail after
//! it, except along the outermost dimension where a monotonically advancing
//! token cursor makes repeated sequential reads skip-free. Sequential
//! access is the only efficient pattern - an out-of-order outermost read
//! reopens the stream and re-skips from the start, and the writer refuses
//! non-contiguous output outright.

use super::error::{
    BadLocation, MalformedData, PartialInnerSlab, UnexpectedEof, WriteOutOfSequence,
};
use super::{check_slab, ArrayBackend, ArrayReader, ArrayWriter, IoError};
use super::error::{RankMismatch, SlabOutOfBounds};
use crate::data::{DataResource, DataSource, ResourceStorage, FORMAT_PLAIN_TEXT};

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Cursor, Write};
use std::path::{Path, PathBuf};

/// The built-in `"PLAIN_TEXT"` backend.
pub struct TextBackend;

impl ArrayBackend for TextBackend {
    fn format(&self) -> &str {
        FORMAT_PLAIN_TEXT
    }

    fn open_reader(
        &self,
        root: &Path,
        source: &DataSource,
        resource: &DataResource,
    ) -> Result<Box<dyn ArrayReader>, IoError> {
        Ok(Box::new(TextReader::open(root, source, resource)?))
    }

    fn open_writer(
        &self,
        root: &Path,
        source: &DataSource,
        resource: &DataResource,
    ) -> Result<Box<dyn ArrayWriter>, IoError> {
        Ok(Box::new(TextWriter::open(root, source, resource)?))
    }
}

/// A data source must be internally consistent before any I/O: declared
/// rank matches every extent array, and the exposed window fits the raw
/// array.
fn check_source(source: &DataSource) -> Result<(), IoError> {
    if source.rank == 0 {
        return Err(RankMismatch::new(1, 0).into());
    }
    for extents in [&source.raw_sizes, &source.offsets, &source.sizes] {
        if extents.len() != source.rank {
            return Err(RankMismatch::new(source.rank, extents.len()).into());
        }
    }
    for dim in 0..source.rank {
        if source.offsets[dim] + source.sizes[dim] > source.raw_sizes[dim] {
            return Err(SlabOutOfBounds::new(
                dim,
                source.offsets[dim],
                source.sizes[dim],
                source.raw_sizes[dim],
            )
            .into());
        }
    }
    Ok(())
}

fn parse_location(location: &str) -> Result<u64, IoError> {
    match location.trim().parse::<u64>() {
        Ok(line) if line >= 1 => Ok(line),
        _ => Err(BadLocation::new(location.to_string()).into()),
    }
}

/// Where the token stream comes from. Kept so an out-of-order read can
/// reopen from the start.
enum TextSource {
    File(PathBuf),
    Inline(String),
}

impl TextSource {
    /// Open the stream and skip to the starting line.
    fn open(&self, start_line: u64) -> Result<Box<dyn BufRead>, IoError> {
        let mut reader: Box<dyn BufRead> = match self {
            Self::File(path) => Box::new(BufReader::new(File::open(path)?)),
            Self::Inline(text) => Box::new(Cursor::new(text.clone().into_bytes())),
        };
        let mut line = String::new();
        for _ in 1..start_line {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                return Err(UnexpectedEof::new(1).into());
            }
        }
        Ok(reader)
    }
}

/// Whitespace-token stream over a line-oriented input.
struct Tokens {
    input: Box<dyn BufRead>,
    line: Vec<String>,
    next: usize,
}

impl Tokens {
    fn new(input: Box<dyn BufRead>) -> Self {
        Self {
            input,
            line: Vec::new(),
            next: 0,
        }
    }

    fn empty() -> Self {
        Self::new(Box::new(Cursor::new(Vec::new())))
    }

    fn next_token(&mut self) -> Result<Option<String>, IoError> {
        while self.next >= self.line.len() {
            let mut raw = String::new();
            if self.input.read_line(&mut raw)? == 0 {
                return Ok(None);
            }
            self.line = raw.split_whitespace().map(str::to_string).collect();
            self.next = 0;
        }
        let token = self.line[self.next].clone();
        self.next += 1;
        Ok(Some(token))
    }
}

/// Element kinds the text backend can tokenize.
trait TextScalar: Copy {
    fn parse(token: &str) -> Option<Self>;
    fn write(self, out: &mut String);
}

impl TextScalar for i32 {
    fn parse(token: &str) -> Option<Self> {
        token.parse().ok()
    }

    fn write(self, out: &mut String) {
        out.push_str(&self.to_string());
    }
}

impl TextScalar for f64 {
    fn parse(token: &str) -> Option<Self> {
        token.parse().ok()
    }

    fn write(self, out: &mut String) {
        let mut buffer = ryu::Buffer::new();
        out.push_str(buffer.format(self));
    }
}

impl TextScalar for bool {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "0" => Some(false),
            "1" => Some(true),
            _ => token.parse::<i64>().ok().map(|v| v != 0),
        }
    }

    fn write(self, out: &mut String) {
        out.push(if self { '1' } else { '0' });
    }
}

/// Slab reader over a text resource.
pub struct TextReader {
    source: TextSource,
    start_line: u64,
    rank: usize,
    raw_sizes: Vec<usize>,
    view_offsets: Vec<usize>,
    view_sizes: Vec<usize>,
    stream: Tokens,
    /// tokens consumed since the data start, i.e. the linear index of the
    /// next unread element
    consumed: usize,
    closed: bool,
}

impl TextReader {
    fn open(root: &Path, source: &DataSource, resource: &DataResource) -> Result<Self, IoError> {
        check_source(source)?;
        let start_line = parse_location(&source.location)?;

        let text_source = match &resource.storage {
            ResourceStorage::Href { href } => TextSource::File(root.join(href)),
            ResourceStorage::Inline { text } => TextSource::Inline(text.clone()),
        };
        let stream = Tokens::new(text_source.open(start_line)?);

        Ok(Self {
            source: text_source,
            start_line,
            rank: source.rank,
            raw_sizes: source.raw_sizes.clone(),
            view_offsets: source.offsets.clone(),
            view_sizes: source.sizes.clone(),
            stream,
            consumed: 0,
            closed: false,
        })
    }

    fn rewind(&mut self) -> Result<(), IoError> {
        self.stream = Tokens::new(self.source.open(self.start_line)?);
        self.consumed = 0;
        Ok(())
    }

    /// Advance the cursor to the given linear element index, rewinding
    /// first if it already moved past.
    fn seek_to(&mut self, target: usize) -> Result<(), IoError> {
        if target < self.consumed {
            self.rewind()?;
        }
        while self.consumed < target {
            if self.stream.next_token()?.is_none() {
                return Err(UnexpectedEof::new(target - self.consumed).into());
            }
            self.consumed += 1;
        }
        Ok(())
    }

    fn read_slab<T: TextScalar>(
        &mut self,
        offsets: &[usize],
        sizes: &[usize],
        out: &mut [T],
    ) -> Result<(), IoError> {
        if self.closed {
            return Err(IoError::ResourceClosed);
        }
        check_slab(self.rank, &self.view_sizes, offsets, sizes, out.len())?;

        // window origin in raw-array coordinates
        let origin: Vec<usize> = self
            .view_offsets
            .iter()
            .zip(offsets)
            .map(|(view, slab)| view + slab)
            .collect();

        let mut strides = vec![1usize; self.rank];
        for dim in (0..self.rank - 1).rev() {
            strides[dim] = strides[dim + 1] * self.raw_sizes[dim + 1];
        }

        let inner = sizes[self.rank - 1];
        let outer_dims = self.rank - 1;
        let mut odometer = vec![0usize; outer_dims];
        let mut out_pos = 0;

        'runs: loop {
            let mut linear = origin[self.rank - 1];
            for dim in 0..outer_dims {
                linear += (origin[dim] + odometer[dim]) * strides[dim];
            }
            self.seek_to(linear)?;

            for step in 0..inner {
                let token = match self.stream.next_token()? {
                    Some(token) => token,
                    None => return Err(UnexpectedEof::new(inner - step).into()),
                };
                self.consumed += 1;
                out[out_pos] = T::parse(&token).ok_or_else(|| MalformedData::new(token))?;
                out_pos += 1;
            }

            // advance the outer odometer, rightmost dimension fastest;
            // row-major order keeps the linear cursor monotonic
            let mut dim = outer_dims;
            while dim > 0 {
                dim -= 1;
                odometer[dim] += 1;
                if odometer[dim] < sizes[dim] {
                    continue 'runs;
                }
                odometer[dim] = 0;
            }
            break;
        }

        Ok(())
    }

    fn close_impl(&mut self) {
        if !self.closed {
            self.closed = true;
            // release the backing file handle right away
            self.stream = Tokens::empty();
        }
    }
}

impl ArrayReader for TextReader {
    fn read_int_slab(
        &mut self,
        offsets: &[usize],
        sizes: &[usize],
        out: &mut [i32],
    ) -> Result<(), IoError> {
        self.read_slab(offsets, sizes, out)
    }

    fn read_double_slab(
        &mut self,
        offsets: &[usize],
        sizes: &[usize],
        out: &mut [f64],
    ) -> Result<(), IoError> {
        self.read_slab(offsets, sizes, out)
    }

    fn read_boolean_slab(
        &mut self,
        offsets: &[usize],
        sizes: &[usize],
        out: &mut [bool],
    ) -> Result<(), IoError> {
        self.read_slab(offsets, sizes, out)
    }

    fn close(&mut self) -> Result<(), IoError> {
        self.close_impl();
        Ok(())
    }
}

impl Drop for TextReader {
    fn drop(&mut self) {
        self.close_impl();
    }
}

/// Slab writer over a text resource. Strictly sequential: each write must
/// continue at the outermost offset where the last one ended, and must
/// cover every inner dimension in full. Each outermost slice becomes one
/// output line.
pub struct TextWriter {
    sink: Option<BufWriter<File>>,
    rank: usize,
    raw_sizes: Vec<usize>,
    written_outer: usize,
    closed: bool,
}

impl TextWriter {
    fn open(root: &Path, source: &DataSource, resource: &DataResource) -> Result<Self, IoError> {
        check_source(source)?;
        parse_location(&source.location)?;

        // a windowed source cannot be regenerated from scratch
        for dim in 0..source.rank {
            if source.offsets[dim] != 0 || source.sizes[dim] != source.raw_sizes[dim] {
                return Err(PartialInnerSlab::new(dim).into());
            }
        }

        let sink = match &resource.storage {
            ResourceStorage::Href { href } => BufWriter::new(File::create(root.join(href))?),
            ResourceStorage::Inline { .. } => return Err(IoError::InlineWrite),
        };

        Ok(Self {
            sink: Some(sink),
            rank: source.rank,
            raw_sizes: source.raw_sizes.clone(),
            written_outer: 0,
            closed: false,
        })
    }

    fn write_slab<T: TextScalar>(
        &mut self,
        offsets: &[usize],
        sizes: &[usize],
        data: &[T],
    ) -> Result<(), IoError> {
        if self.closed {
            return Err(IoError::ResourceClosed);
        }
        check_slab(self.rank, &self.raw_sizes, offsets, sizes, data.len())?;

        if offsets[0] != self.written_outer {
            return Err(WriteOutOfSequence::new(self.written_outer, offsets[0]).into());
        }
        for dim in 1..self.rank {
            if offsets[dim] != 0 || sizes[dim] != self.raw_sizes[dim] {
                return Err(PartialInnerSlab::new(dim).into());
            }
        }

        let sink = match self.sink.as_mut() {
            Some(sink) => sink,
            None => return Err(IoError::ResourceClosed),
        };

        let run: usize = sizes[1..].iter().product();
        let mut line = String::new();
        for outer in 0..sizes[0] {
            line.clear();
            for value in &data[outer * run..(outer + 1) * run] {
                if !line.is_empty() {
                    line.push(' ');
                }
                value.write(&mut line);
            }
            line.push('\n');
            sink.write_all(line.as_bytes())?;
        }

        self.written_outer += sizes[0];
        Ok(())
    }

    fn close_impl(&mut self) -> Result<(), IoError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        if let Some(mut sink) = self.sink.take() {
            sink.flush()?;
        }
        Ok(())
    }
}

impl ArrayWriter for TextWriter {
    fn write_int_slab(
        &mut self,
        offsets: &[usize],
        sizes: &[usize],
        data: &[i32],
    ) -> Result<(), IoError> {
        self.write_slab(offsets, sizes, data)
    }

    fn write_double_slab(
        &mut self,
        offsets: &[usize],
        sizes: &[usize],
        data: &[f64],
    ) -> Result<(), IoError> {
        self.write_slab(offsets, sizes, data)
    }

    fn write_boolean_slab(
        &mut self,
        offsets: &[usize],
        sizes: &[usize],
        data: &[bool],
    ) -> Result<(), IoError> {
        self.write_slab(offsets, sizes, data)
    }

    fn close(&mut self) -> Result<(), IoError> {
        self.close_impl()
    }
}

impl Drop for TextWriter {
    fn drop(&mut self) {
        let _ = self.close_impl();
    }
}
