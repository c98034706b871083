use super::{attributes::Attribute, error::DirectoryError, object::Object, store::Objects};
use log::{error, info, warn};
use serde::Deserialize;
use std::{
    collections::HashMap,
    fs::File,
    io::{BufRead, BufReader},
};

/// One dumped directory object. Binary attribute values are base64 encoded
#[derive(Debug, Deserialize)]
pub struct ObjectRecord {
    pub dn: String,
    #[serde(default)]
    pub attributes: HashMap<String, Vec<String>>,
}

impl ObjectRecord {
    pub fn into_object(self) -> Object {
        let mut attributes: HashMap<Attribute, Vec<String>> = HashMap::new();
        for (name, mut values) in self.attributes {
            attributes
                .entry(Attribute::from_name(&name))
                .or_default()
                .append(&mut values);
        }
        Object::new(&self.dn, attributes)
    }
}

/// Load a JSON Lines file of directory objects into a new store
pub fn load_objects(path: &str) -> Result<Objects, DirectoryError> {
    let file = match File::open(path) {
        Ok(result) => result,
        Err(err) => {
            error!("[directory] Could not open objects file {path}: {err:?}");
            return Err(DirectoryError::ReadFile);
        }
    };

    let mut objects = Objects::new();
    let loaded = read_objects(BufReader::new(file), &mut objects)?;
    if loaded == 0 {
        warn!("[directory] No objects found in {path}");
        return Err(DirectoryError::NoObjects);
    }
    info!("[directory] Loaded {loaded} objects from {path}");
    Ok(objects)
}

/// Add every record in `reader` to `objects`. Malformed lines are logged and skipped
pub fn read_objects<R: BufRead>(reader: R, objects: &mut Objects) -> Result<usize, DirectoryError> {
    let mut loaded = 0;
    for (number, line_result) in reader.lines().enumerate() {
        let line = match line_result {
            Ok(result) => result,
            Err(err) => {
                error!("[directory] Could not read objects line {}: {err:?}", number + 1);
                return Err(DirectoryError::ReadFile);
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let record: ObjectRecord = match serde_json::from_str(&line) {
            Ok(result) => result,
            Err(err) => {
                warn!("[directory] Skipping malformed object on line {}: {err:?}", number + 1);
                continue;
            }
        };
        if record.dn.is_empty() {
            warn!("[directory] Skipping object without a DN on line {}", number + 1);
            continue;
        }
        objects.add(record.into_object());
        loaded += 1;
    }
    Ok(loaded)
}
