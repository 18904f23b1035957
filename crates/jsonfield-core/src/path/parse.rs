use super::{JsonPath, PathError, PathSegment};

///
/// Parser
///
/// Single-pass scanner over the path text. All delimiters are ASCII, so
/// byte offsets always land on char boundaries when slicing keys.
///

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    segments: Vec<PathSegment>,
}

pub(super) fn parse(expr: &str) -> Result<JsonPath, PathError> {
    let src = expr.trim();
    if src.is_empty() || src == "$" {
        return Err(PathError::Empty);
    }

    let mut parser = Parser {
        src,
        pos: 0,
        segments: Vec::new(),
    };
    parser.run()?;

    JsonPath::new(parser.segments)
}

impl Parser<'_> {
    fn run(&mut self) -> Result<(), PathError> {
        match self.peek() {
            Some(b'$') => self.pos += 1,
            // relative form: the first key carries no leading dot
            Some(b'"') => self.quoted_key(self.pos)?,
            Some(b'[') => {}
            Some(_) => self.bare_key(self.pos)?,
            None => return Err(PathError::Empty),
        }

        while let Some(byte) = self.peek() {
            match byte {
                b'.' => {
                    let dot = self.pos;
                    self.pos += 1;
                    if self.peek() == Some(b'"') {
                        self.quoted_key(dot)?;
                    } else {
                        self.bare_key(dot)?;
                    }
                }
                b'[' => self.index()?,
                _ => return Err(self.unexpected()),
            }
        }

        Ok(())
    }

    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn unexpected(&self) -> PathError {
        let found = self.src[self.pos..].chars().next().unwrap_or_default();

        PathError::UnexpectedChar {
            path: self.src.to_string(),
            offset: self.pos,
            found,
        }
    }

    fn bare_key(&mut self, start: usize) -> Result<(), PathError> {
        let begin = self.pos;
        while let Some(byte) = self.peek() {
            match byte {
                b'.' | b'[' => break,
                b']' | b'"' | b'$' => return Err(self.unexpected()),
                _ => self.pos += 1,
            }
        }

        let key = &self.src[begin..self.pos];
        if key.is_empty() {
            return Err(PathError::EmptyKey {
                path: self.src.to_string(),
                offset: start,
            });
        }
        self.segments.push(PathSegment::key(key));

        Ok(())
    }

    fn quoted_key(&mut self, start: usize) -> Result<(), PathError> {
        let open = self.pos;
        let body = open + 1;
        let Some(len) = self.src[body..].find('"') else {
            return Err(PathError::UnterminatedQuote {
                path: self.src.to_string(),
                offset: open,
            });
        };

        let key = &self.src[body..body + len];
        if key.is_empty() {
            return Err(PathError::EmptyKey {
                path: self.src.to_string(),
                offset: start,
            });
        }
        self.segments.push(PathSegment::key(key));
        self.pos = body + len + 1;

        Ok(())
    }

    fn index(&mut self) -> Result<(), PathError> {
        let open = self.pos;
        let body = open + 1;
        let Some(len) = self.src[body..].find(']') else {
            return Err(PathError::UnterminatedBracket {
                path: self.src.to_string(),
                offset: open,
            });
        };

        let raw = &self.src[body..body + len];
        let invalid = || PathError::InvalidIndex {
            path: self.src.to_string(),
            offset: open,
            index: raw.to_string(),
        };

        // `usize::from_str` accepts a leading '+'; only plain digits are indexes.
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let index = raw.parse::<usize>().map_err(|_| invalid())?;

        self.segments.push(PathSegment::Index(index));
        self.pos = body + len + 1;

        Ok(())
    }
}
