// heli_core/src/utils/serde_helpers.rs

//! `serde(with = ...)` adapters so nalgebra types appear as plain arrays in
//! flight logs and configuration files.

/// `Vector3<f64>` as `[x, y, z]`.
pub mod vec3_array {
    use nalgebra::Vector3;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(vec: &Vector3<f64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq([vec.x, vec.y, vec.z].iter())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vector3<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let arr: [f64; 3] = Deserialize::deserialize(deserializer)?;
        Ok(Vector3::new(arr[0], arr[1], arr[2]))
    }
}

/// `UnitQuaternion<f64>` as `[x, y, z, w]`.
pub mod quat_xyzw_array {
    use nalgebra::{Quaternion, UnitQuaternion};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(quat: &UnitQuaternion<f64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let q = quat.as_ref();
        serializer.collect_seq([q.i, q.j, q.k, q.w].iter())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<UnitQuaternion<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let arr: [f64; 4] = Deserialize::deserialize(deserializer)?;
        // nalgebra's constructor takes (w, i, j, k)
        Ok(UnitQuaternion::from_quaternion(Quaternion::new(
            arr[3], arr[0], arr[1], arr[2],
        )))
    }
}

/// `Vector2<f64>` (map coordinates) as `[x, z]`.
pub mod vec2_array {
    use nalgebra::Vector2;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(vec: &Vector2<f64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq([vec.x, vec.y].iter())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vector2<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let arr: [f64; 2] = Deserialize::deserialize(deserializer)?;
        Ok(Vector2::new(arr[0], arr[1]))
    }
}
