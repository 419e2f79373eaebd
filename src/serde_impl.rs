use std::result;

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeSeq, Serializer};

use crate::record::Record;

impl Serialize for Record {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for field in self {
            seq.serialize_element(&field)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> result::Result<Record, D::Error> {
        Vec::<Option<String>>::deserialize(deserializer).map(Record::from)
    }
}
