//! Plain text and JSON file readers and writers.

use super::UtilError;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Opens `path` and returns a lazy iterator over its lines.
///
/// # Errors
///
/// Returns [`UtilError::Io`] if the file cannot be opened.
pub fn read_lines(path: impl AsRef<Path>) -> Result<io::Lines<BufReader<File>>, UtilError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| UtilError::io(path, e))?;
    Ok(BufReader::new(file).lines())
}

/// Writes every item of `lines` verbatim to `path`, replacing its content.
///
/// Items are not separated; include `\n` where line breaks are wanted. A
/// single string is written with `save_text_file(path, [text])`.
///
/// # Errors
///
/// Returns [`UtilError::Io`] on any write failure.
pub fn save_text_file<I, S>(path: impl AsRef<Path>, lines: I) -> Result<(), UtilError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| UtilError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    for line in lines {
        writer
            .write_all(line.as_ref().as_bytes())
            .map_err(|e| UtilError::io(path, e))?;
    }
    writer.flush().map_err(|e| UtilError::io(path, e))
}

/// Writes `data` to `path` as pretty-printed JSON.
///
/// Objects are written with sorted keys and a two-space indent; non-ASCII
/// text is kept as-is.
///
/// # Errors
///
/// Returns [`UtilError::Json`] if `data` cannot be serialized and
/// [`UtilError::Io`] on write failures.
pub fn save_json_file<T>(path: impl AsRef<Path>, data: &T) -> Result<(), UtilError>
where
    T: Serialize + ?Sized,
{
    let path = path.as_ref();
    // Going through `Value` sorts struct fields as well as map keys.
    let value = serde_json::to_value(data).map_err(|e| UtilError::Json {
        path: path.to_path_buf(),
        source: e,
    })?;

    let file = File::create(path).map_err(|e| UtilError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &value).map_err(|e| UtilError::Json {
        path: path.to_path_buf(),
        source: e,
    })?;
    writer
        .write_all(b"\n")
        .and_then(|()| writer.flush())
        .map_err(|e| UtilError::io(path, e))
}

/// Reads `path` and parses it as a JSON object.
///
/// # Errors
///
/// Returns [`UtilError::Io`], [`UtilError::Json`] for malformed documents,
/// or [`UtilError::NotAnObject`] when the top level is not an object.
pub fn load_json_object(path: impl AsRef<Path>) -> Result<Map<String, Value>, UtilError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| UtilError::io(path, e))?;
    let value: Value =
        serde_json::from_reader(BufReader::new(file)).map_err(|e| UtilError::Json {
            path: path.to_path_buf(),
            source: e,
        })?;

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(UtilError::NotAnObject {
            path: path.to_path_buf(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_save_text_file_one_line() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("one.txt");

        save_text_file(&file, ["abcd"]).unwrap();
        assert_eq!(fs::read_to_string(&file).unwrap(), "abcd");
    }

    #[test]
    fn test_save_text_file_from_iterator() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("multi.txt");

        save_text_file(&file, (0..3).map(|i| format!("{i}x\n"))).unwrap();
        assert_eq!(fs::read_to_string(&file).unwrap(), "0x\n1x\n2x\n");
    }

    #[test]
    fn test_read_lines() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("lines.txt");
        fs::write(&file, "first\nsecond\n").unwrap();

        let lines = read_lines(&file)
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(lines, ["first", "second"]);
    }

    #[test]
    fn test_read_lines_missing_file() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            read_lines(tmp.path().join("missing.log")),
            Err(UtilError::Io { .. })
        ));
    }

    #[test]
    fn test_save_json_file_sorted_and_indented() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("data.json");

        save_json_file(&file, &json!({"q": "qwe", "b": "bcx", "u": "ünï"})).unwrap();

        insta::assert_snapshot!(fs::read_to_string(&file).unwrap(), @r#"
        {
          "b": "bcx",
          "q": "qwe",
          "u": "ünï"
        }
        "#);
    }

    #[test]
    fn test_load_json_object() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("cfg.json");
        fs::write(&file, r#"{"a": 1}"#).unwrap();

        let map = load_json_object(&file).unwrap();
        assert_eq!(map.get("a"), Some(&json!(1)));
    }

    #[test]
    fn test_load_json_object_rejects_non_objects() {
        let tmp = TempDir::new().unwrap();
        let list = tmp.path().join("list.json");
        fs::write(&list, "[1, 2]").unwrap();
        let broken = tmp.path().join("broken.json");
        fs::write(&broken, "{").unwrap();

        assert!(matches!(
            load_json_object(&list),
            Err(UtilError::NotAnObject { .. })
        ));
        assert!(matches!(
            load_json_object(&broken),
            Err(UtilError::Json { .. })
        ));
    }
}
