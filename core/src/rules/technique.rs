use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

/// One privilege escalation primitive. Labels a capability edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Technique {
    AclContainsDeny,
    Owns,
    GenericAll,
    WriteAll,
    WritePropertyAll,
    WriteDacl,
    TakeOwnership,
    AllExtendedRights,
    ResetPassword,
    AddMember,
    AddMemberGroupAttr,
    AddSelfMember,
    WriteSpn,
    WriteAltSecurityIdentities,
    WriteProfilePath,
    WriteScriptPath,
    WriteKeyCredentialLink,
    WriteAllowedToAct,
    WriteGpLink,
    CreateAnyObject,
    CreateComputer,
    ReadMsaPassword,
    ReadLapsPassword,
    MemberOfGroup,
    GpoLinked,
    DcSync,
    AdminSdHolderOverwrite,
    AttackerIsEveryone,
}

impl Technique {
    pub const ALL: [Technique; 28] = [
        Technique::AclContainsDeny,
        Technique::Owns,
        Technique::GenericAll,
        Technique::WriteAll,
        Technique::WritePropertyAll,
        Technique::WriteDacl,
        Technique::TakeOwnership,
        Technique::AllExtendedRights,
        Technique::ResetPassword,
        Technique::AddMember,
        Technique::AddMemberGroupAttr,
        Technique::AddSelfMember,
        Technique::WriteSpn,
        Technique::WriteAltSecurityIdentities,
        Technique::WriteProfilePath,
        Technique::WriteScriptPath,
        Technique::WriteKeyCredentialLink,
        Technique::WriteAllowedToAct,
        Technique::WriteGpLink,
        Technique::CreateAnyObject,
        Technique::CreateComputer,
        Technique::ReadMsaPassword,
        Technique::ReadLapsPassword,
        Technique::MemberOfGroup,
        Technique::GpoLinked,
        Technique::DcSync,
        Technique::AdminSdHolderOverwrite,
        Technique::AttackerIsEveryone,
    ];

    /// Deny markers annotate a graph but never let an expansion reach further
    pub fn is_deny_marker(&self) -> bool {
        *self == Technique::AclContainsDeny
    }

    pub fn name(&self) -> &'static str {
        match self {
            Technique::AclContainsDeny => "ACLContainsDeny",
            Technique::Owns => "Owns",
            Technique::GenericAll => "GenericAll",
            Technique::WriteAll => "WriteAll",
            Technique::WritePropertyAll => "WritePropertyAll",
            Technique::WriteDacl => "WriteDACL",
            Technique::TakeOwnership => "TakeOwnership",
            Technique::AllExtendedRights => "AllExtendedRights",
            Technique::ResetPassword => "ResetPassword",
            Technique::AddMember => "AddMember",
            Technique::AddMemberGroupAttr => "AddMemberGroupAttr",
            Technique::AddSelfMember => "AddSelfMember",
            Technique::WriteSpn => "WriteSPN",
            Technique::WriteAltSecurityIdentities => "WriteAltSecurityIdentities",
            Technique::WriteProfilePath => "WriteProfilePath",
            Technique::WriteScriptPath => "WriteScriptPath",
            Technique::WriteKeyCredentialLink => "WriteKeyCredentialLink",
            Technique::WriteAllowedToAct => "WriteAllowedToAct",
            Technique::WriteGpLink => "WriteGPLink",
            Technique::CreateAnyObject => "CreateAnyObject",
            Technique::CreateComputer => "CreateComputer",
            Technique::ReadMsaPassword => "ReadMSAPassword",
            Technique::ReadLapsPassword => "ReadLAPSPassword",
            Technique::MemberOfGroup => "MemberOfGroup",
            Technique::GpoLinked => "GPOLinked",
            Technique::DcSync => "DCsync",
            Technique::AdminSdHolderOverwrite => "AdminSDHolderOverwrite",
            Technique::AttackerIsEveryone => "AttackerIsEveryone",
        }
    }
}

impl fmt::Display for Technique {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Technique {
    type Err = String;

    /// Case insensitive, accepts both the display name and the variant name
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim();
        for technique in Technique::ALL {
            if technique.name().eq_ignore_ascii_case(wanted)
                || format!("{technique:?}").eq_ignore_ascii_case(wanted)
            {
                return Ok(technique);
            }
        }
        Err(format!("Unknown technique {wanted}"))
    }
}

/// Serialized as the display name
impl Serialize for Technique {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Technique {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Technique::from_str(&value).map_err(de::Error::custom)
    }
}
