use std::io::BufRead;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    Blob,
    Tree,
    Commit,
    // reserved, never written by this crate
    Tag,
}

/// Decoded `"<kind> <length>\0"` header of a stored object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectHeader {
    pub object_type: ObjectType,
    pub size: usize,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Blob => "blob",
            ObjectType::Tree => "tree",
            ObjectType::Commit => "commit",
            ObjectType::Tag => "tag",
        }
    }

    /// Read the object header from the front of a decompressed object
    ///
    /// Leaves the reader positioned on the first payload byte. Errors are
    /// plain strings; the caller knows which object is being read.
    pub fn parse_object_header(data_reader: &mut impl BufRead) -> Result<ObjectHeader, String> {
        let mut object_type = Vec::new();
        data_reader
            .read_until(b' ', &mut object_type)
            .map_err(|e| e.to_string())?;
        if object_type.pop() != Some(b' ') {
            return Err("missing space after object kind".to_string());
        }

        let object_type = std::str::from_utf8(&object_type)
            .map_err(|_| "object kind is not valid UTF-8".to_string())?;
        let object_type = ObjectType::try_from(object_type)?;

        let mut size = Vec::new();
        data_reader
            .read_until(b'\0', &mut size)
            .map_err(|e| e.to_string())?;
        if size.pop() != Some(b'\0') {
            return Err("missing NUL after object length".to_string());
        }

        let size = std::str::from_utf8(&size)
            .ok()
            .filter(|size| !size.is_empty() && size.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|size| size.parse::<usize>().ok())
            .ok_or_else(|| "object length is not a decimal number".to_string())?;

        Ok(ObjectHeader { object_type, size })
    }
}

impl TryFrom<&str> for ObjectType {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "blob" => Ok(ObjectType::Blob),
            "tree" => Ok(ObjectType::Tree),
            "commit" => Ok(ObjectType::Commit),
            "tag" => Ok(ObjectType::Tag),
            _ => Err(format!("invalid object kind {value:?}")),
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
