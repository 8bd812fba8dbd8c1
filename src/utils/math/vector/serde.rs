use num::Num;
use serde::de::Error as _;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::ZeroSpVec;

impl<N> Serialize for ZeroSpVec<N>
where
    N: Num + Serialize + Copy,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // フィールドは len, nnz, entries
        let mut state = serializer.serialize_struct("ZeroSpVec", 3)?;
        state.serialize_field("len", &(self.len() as u64))?;
        state.serialize_field("nnz", &(self.nnz() as u64))?;
        // entries: (index, value) を昇順で出力
        let entries: Vec<(u64, N)> = self
            .raw_iter()
            .map(|(idx, val)| (idx as u64, *val))
            .collect();
        state.serialize_field("entries", &entries)?;
        state.end()
    }
}

impl<'de, N> Deserialize<'de> for ZeroSpVec<N>
where
    N: Num + Deserialize<'de> + Copy,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct ZeroSpVecData<N> {
            len: u64,
            nnz: u64,
            entries: Vec<(u64, N)>,
        }

        let data = ZeroSpVecData::deserialize(deserializer)?;
        if data.nnz != data.entries.len() as u64 {
            return Err(D::Error::custom(format!(
                "nnz {} does not match {} entries",
                data.nnz,
                data.entries.len()
            )));
        }
        let len = usize::try_from(data.len).map_err(D::Error::custom)?;
        ZeroSpVec::try_from_sorted(len, data.entries).ok_or_else(|| {
            D::Error::custom("entries must be strictly ascending and within len")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cbor_keeps_exact_f64_bits() {
        let sp = ZeroSpVec::from_pairs(5, vec![(4, 0.1f64 + 0.2), (1, 1.0 / 3.0)]);
        let bytes = serde_cbor::to_vec(&sp).unwrap();
        let back: ZeroSpVec<f64> = serde_cbor::from_slice(&bytes).unwrap();
        assert_eq!(back, sp);
        assert_eq!(back.get(4).unwrap().to_bits(), (0.1f64 + 0.2).to_bits());
    }

    #[test]
    fn rejects_unsorted_entries() {
        let json = r#"{"len":3,"nnz":2,"entries":[[2,1.0],[0,1.0]]}"#;
        assert!(serde_json::from_str::<ZeroSpVec<f64>>(json).is_err());
        let json = r#"{"len":3,"nnz":1,"entries":[[0,1.0],[1,1.0]]}"#;
        assert!(serde_json::from_str::<ZeroSpVec<f64>>(json).is_err());
    }
}
