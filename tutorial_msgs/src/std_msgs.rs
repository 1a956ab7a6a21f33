use rosrust::{Message, RosMsg};
use std::io;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct String {
    pub data: ::std::string::String,
}

impl String {
    pub fn new(data: impl Into<::std::string::String>) -> Self {
        Self { data: data.into() }
    }
}

impl Message for String {
    fn msg_definition() -> ::std::string::String {
        "string data\n".into()
    }

    fn md5sum() -> ::std::string::String {
        "992ce8a1687cec8c8bd883ec73ca41d1".into()
    }

    fn msg_type() -> ::std::string::String {
        "std_msgs/String".into()
    }
}

impl RosMsg for String {
    fn encode<W: io::Write>(&self, mut w: W) -> io::Result<()> {
        self.data.encode(w.by_ref())
    }

    fn decode<R: io::Read>(mut r: R) -> io::Result<Self> {
        Ok(Self {
            data: RosMsg::decode(r.by_ref())?,
        })
    }
}
