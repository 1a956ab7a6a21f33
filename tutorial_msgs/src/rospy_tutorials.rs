use rosrust::{Message, RosMsg, ServicePair};
use std::io;

/// `rospy_tutorials/AddTwoInts` service pair.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AddTwoInts;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AddTwoIntsReq {
    pub a: i64,
    pub b: i64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AddTwoIntsRes {
    pub sum: i64,
}

impl Message for AddTwoInts {
    fn msg_definition() -> String {
        format!(
            "{}---\n{}",
            AddTwoIntsReq::msg_definition(),
            AddTwoIntsRes::msg_definition()
        )
    }

    fn md5sum() -> String {
        "6a2e34150c00229791cc89ff309fff21".into()
    }

    fn msg_type() -> String {
        "rospy_tutorials/AddTwoInts".into()
    }
}

impl RosMsg for AddTwoInts {
    fn encode<W: io::Write>(&self, _w: W) -> io::Result<()> {
        Ok(())
    }

    fn decode<R: io::Read>(_r: R) -> io::Result<Self> {
        Ok(Self)
    }
}

impl ServicePair for AddTwoInts {
    type Request = AddTwoIntsReq;
    type Response = AddTwoIntsRes;
}

impl Message for AddTwoIntsReq {
    fn msg_definition() -> String {
        "int64 a\nint64 b\n".into()
    }

    fn md5sum() -> String {
        "36d09b846be0b371c5f190354dd3153e".into()
    }

    fn msg_type() -> String {
        "rospy_tutorials/AddTwoIntsRequest".into()
    }
}

impl RosMsg for AddTwoIntsReq {
    fn encode<W: io::Write>(&self, mut w: W) -> io::Result<()> {
        self.a.encode(w.by_ref())?;
        self.b.encode(w.by_ref())
    }

    fn decode<R: io::Read>(mut r: R) -> io::Result<Self> {
        Ok(Self {
            a: RosMsg::decode(r.by_ref())?,
            b: RosMsg::decode(r.by_ref())?,
        })
    }
}

impl Message for AddTwoIntsRes {
    fn msg_definition() -> String {
        "int64 sum\n".into()
    }

    fn md5sum() -> String {
        "b88405221c77b1878a3cbbffff53428b".into()
    }

    fn msg_type() -> String {
        "rospy_tutorials/AddTwoIntsResponse".into()
    }
}

impl RosMsg for AddTwoIntsRes {
    fn encode<W: io::Write>(&self, mut w: W) -> io::Result<()> {
        self.sum.encode(w.by_ref())
    }

    fn decode<R: io::Read>(mut r: R) -> io::Result<Self> {
        Ok(Self {
            sum: RosMsg::decode(r.by_ref())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_is_two_little_endian_int64() {
        let bytes = AddTwoIntsReq { a: 1, b: -1 }.encode_vec().unwrap();
        assert_eq!(&bytes[..4], &[16, 0, 0, 0]);
        assert_eq!(&bytes[4..12], &1i64.to_le_bytes());
        assert_eq!(&bytes[12..], &(-1i64).to_le_bytes());
    }

    #[test]
    fn service_definition_joins_request_and_response() {
        assert_eq!(
            AddTwoInts::msg_definition(),
            "int64 a\nint64 b\n---\nint64 sum\n"
        );
    }
}
