use crate::{commands::CommandError, resp::RespValue};

const MASTER_REPLID: &str = "8371b4fb1155b71f4a04d3e1bc3e18c4a990aeeb";

enum InfoSection {
    Default,
    Replication,
}

pub struct InfoArguments {
    section: InfoSection,
}

impl InfoArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        match arguments {
            [] => Ok(InfoArguments {
                section: InfoSection::Default,
            }),
            [section] => match section.to_lowercase().as_str() {
                "replication" => Ok(InfoArguments {
                    section: InfoSection::Replication,
                }),
                _ => Err(CommandError::InvalidInfoSection(section.clone())),
            },
            _ => Err(CommandError::wrong_number_of_arguments("info")),
        }
    }
}

/// Replication is not modelled: the server always reports itself as a
/// master with no replicas.
pub fn info(arguments: &[String]) -> Result<RespValue, CommandError> {
    let info_arguments = InfoArguments::parse(arguments)?;

    let replication = [
        "# Replication".to_string(),
        "role:master".to_string(),
        "connected_slaves:0".to_string(),
        format!("master_replid:{}", MASTER_REPLID),
        "master_repl_offset:0".to_string(),
    ];

    match info_arguments.section {
        InfoSection::Default | InfoSection::Replication => {
            Ok(RespValue::BulkString(replication.join("\r\n")))
        }
    }
}
