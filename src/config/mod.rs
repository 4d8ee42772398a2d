//! Configuration: the `.gitflow.toml` file and `-D` user properties

pub mod properties;
pub mod settings;

pub use properties::{parse_define, UserProperties};
pub use settings::{
    AdditionalVersionCommand, BranchSettings, BuildBackend, BuildSettings, CommitMessages,
    FlowConfig, RemoteSettings, VersionSettings, WorkflowSettings, CONFIG_FILE_NAME,
};
