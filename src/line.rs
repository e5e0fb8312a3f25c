use std::io;

/// A source of physical lines of text.
///
/// Readers pull their input one line at a time through this trait. It is
/// implemented for every `io::BufRead` and, through `IterLines`, for any
/// iterator of strings.
pub trait LineSource {
    /// Replace the contents of `buf` with the next line.
    ///
    /// The line may keep its terminator. Returns `false` when there are no
    /// more lines, in which case `buf` is left empty.
    fn next_line(&mut self, buf: &mut String) -> io::Result<bool>;
}

impl<R: io::BufRead> LineSource for R {
    fn next_line(&mut self, buf: &mut String) -> io::Result<bool> {
        buf.clear();
        Ok(self.read_line(buf)? > 0)
    }
}

/// A line source backed by an iterator of strings.
///
/// Each item of the iterator is one physical line. Items don't need a line
/// terminator.
///
/// # Example
///
/// ```
/// use csv_dialect::{IterLines, Reader};
///
/// let lines = vec!["a,b", "c,d"];
/// let mut rdr = Reader::from_reader(IterLines::new(lines));
/// let records: Vec<_> = rdr.records().collect::<Result<_, _>>().unwrap();
/// assert_eq!(2, records.len());
/// ```
#[derive(Clone, Debug)]
pub struct IterLines<I> {
    it: I,
}

impl<I> IterLines<I> {
    /// Wrap an iterator of lines.
    pub fn new<T>(it: T) -> IterLines<I>
    where
        T: IntoIterator<IntoIter = I>,
    {
        IterLines { it: it.into_iter() }
    }

    /// Returns the underlying iterator.
    pub fn into_inner(self) -> I {
        self.it
    }
}

impl<I> LineSource for IterLines<I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    fn next_line(&mut self, buf: &mut String) -> io::Result<bool> {
        buf.clear();
        match self.it.next() {
            None => Ok(false),
            Some(line) => {
                buf.push_str(line.as_ref());
                Ok(true)
            }
        }
    }
}

/// A destination for terminated lines of text.
///
/// Writers hand every row to the sink in a single `write_line` call. It is
/// implemented for every `io::Write`.
pub trait LineSink {
    /// Write one row, including its terminator.
    fn write_line(&mut self, line: &str) -> io::Result<()>;

    /// Flush any buffered data to the underlying destination.
    fn flush(&mut self) -> io::Result<()>;
}

impl<W: io::Write> LineSink for W {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.write_all(line.as_bytes())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::Write::flush(self)
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::{IterLines, LineSink, LineSource};

    #[test]
    fn buf_read_keeps_terminators() {
        let mut src = io::Cursor::new("a,b\r\nc\n\nd");
        let mut buf = String::new();
        let mut lines = vec![];
        while src.next_line(&mut buf).unwrap() {
            lines.push(buf.clone());
        }
        assert_eq!(vec!["a,b\r\n", "c\n", "\n", "d"], lines);
        assert!(buf.is_empty());
    }

    #[test]
    fn iter_lines() {
        let mut src = IterLines::new(vec!["x".to_string(), "y".to_string()]);
        let mut buf = String::from("junk");
        assert!(src.next_line(&mut buf).unwrap());
        assert_eq!("x", buf);
        assert!(src.next_line(&mut buf).unwrap());
        assert_eq!("y", buf);
        assert!(!src.next_line(&mut buf).unwrap());
    }

    #[test]
    fn sink() {
        let mut out: Vec<u8> = vec![];
        out.write_line("a,b\r\n").unwrap();
        LineSink::flush(&mut out).unwrap();
        assert_eq!(b"a,b\r\n".to_vec(), out);
    }
}
