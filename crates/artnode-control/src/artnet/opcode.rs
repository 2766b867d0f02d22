//! Art-Net opcodes

/// Message type carried in the packet header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCode {
    /// ArtPoll: discovery request
    Poll,
    /// ArtPollReply: discovery response
    PollReply,
    /// ArtDmx: one universe of channel data
    Dmx,
    /// ArtAddress: remote programming of names and switches
    Address,
    /// ArtIpProg: remote IP programming
    IpProg,
    /// ArtIpProgReply
    IpProgReply,
    /// Anything this node does not handle
    Unknown(u16),
}

impl OpCode {
    pub const POLL: u16 = 0x2000;
    pub const POLL_REPLY: u16 = 0x2100;
    pub const DMX: u16 = 0x5000;
    pub const ADDRESS: u16 = 0x6000;
    pub const IP_PROG: u16 = 0xF800;
    pub const IP_PROG_REPLY: u16 = 0xF900;

    /// Numeric value as carried on the wire (before byte ordering)
    pub fn value(self) -> u16 {
        match self {
            OpCode::Poll => Self::POLL,
            OpCode::PollReply => Self::POLL_REPLY,
            OpCode::Dmx => Self::DMX,
            OpCode::Address => Self::ADDRESS,
            OpCode::IpProg => Self::IP_PROG,
            OpCode::IpProgReply => Self::IP_PROG_REPLY,
            OpCode::Unknown(value) => value,
        }
    }
}

impl From<u16> for OpCode {
    fn from(value: u16) -> Self {
        match value {
            Self::POLL => OpCode::Poll,
            Self::POLL_REPLY => OpCode::PollReply,
            Self::DMX => OpCode::Dmx,
            Self::ADDRESS => OpCode::Address,
            Self::IP_PROG => OpCode::IpProg,
            Self::IP_PROG_REPLY => OpCode::IpProgReply,
            other => OpCode::Unknown(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_opcodes() {
        assert_eq!(OpCode::from(0x2000), OpCode::Poll);
        assert_eq!(OpCode::from(0x5000), OpCode::Dmx);
        assert_eq!(OpCode::from(0xF800), OpCode::IpProg);
        assert_eq!(OpCode::Dmx.value(), 0x5000);
    }

    #[test]
    fn test_unknown_opcode_keeps_value() {
        let op = OpCode::from(0x9700);
        assert_eq!(op, OpCode::Unknown(0x9700));
        assert_eq!(op.value(), 0x9700);
    }
}
