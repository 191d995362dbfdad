//! Command-line surface.

use clap::{Args, Parser, Subcommand};
use hospital_core::EntityId;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "hospital", version, about = "Hospital records kept in one JSON file")]
pub struct Cli {
    /// Data file; created on first save.
    #[arg(long, global = true, default_value = "hospital_data.json")]
    pub data: PathBuf,

    /// Absolute directory for rolling log files. Logging is off when unset.
    #[arg(long, global = true)]
    pub log_dir: Option<String>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(subcommand)]
    Patient(PatientCommand),
    #[command(subcommand)]
    Doctor(DoctorCommand),
    #[command(subcommand)]
    Appointment(AppointmentCommand),
    #[command(subcommand)]
    Bill(BillCommand),
    #[command(subcommand)]
    Record(RecordCommand),
    /// Upcoming appointments, history and balance for one patient.
    Summary { patient: EntityId },
    /// Entity counts.
    Stats,
}

#[derive(Debug, Subcommand)]
pub enum PatientCommand {
    Add(PatientFields),
    Show { id: EntityId },
    List,
    Update {
        id: EntityId,
        #[command(flatten)]
        fields: PatientUpdateFields,
    },
    Delete {
        id: EntityId,
        /// Also delete the patient's appointments, bills and records.
        #[arg(long)]
        cascade: bool,
    },
}

#[derive(Debug, Args)]
pub struct PatientFields {
    #[arg(long)]
    pub name: String,
    /// YYYY-MM-DD
    #[arg(long)]
    pub dob: String,
    #[arg(long)]
    pub phone: String,
    #[arg(long)]
    pub email: String,
    /// M|F|O
    #[arg(long)]
    pub gender: Option<String>,
    #[arg(long)]
    pub blood_type: Option<String>,
    /// Repeat for several allergies.
    #[arg(long = "allergy")]
    pub allergies: Vec<String>,
    #[command(flatten)]
    pub address: AddressFields,
}

#[derive(Debug, Args)]
pub struct PatientUpdateFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub dob: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub gender: Option<String>,
    #[arg(long)]
    pub blood_type: Option<String>,
    /// Replaces the allergy list; repeat for several.
    #[arg(long = "allergy")]
    pub allergies: Option<Vec<String>>,
    // Any address part replaces the whole address.
    #[command(flatten)]
    pub address: AddressFields,
    #[arg(long, conflicts_with_all = ["street", "city", "state", "zip", "country"])]
    pub clear_address: bool,
}

/// Address parts. Street, city and zip are required once any part is given.
#[derive(Debug, Args)]
pub struct AddressFields {
    #[arg(long)]
    pub street: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub state: Option<String>,
    #[arg(long)]
    pub zip: Option<String>,
    /// Defaults to USA.
    #[arg(long)]
    pub country: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum DoctorCommand {
    Add(DoctorFields),
    Show { id: EntityId },
    List,
    Delete {
        id: EntityId,
        /// Also delete the doctor's appointments (with their bills) and every
        /// medical record the doctor attended. Those records disappear from
        /// the patients' clinical history and cannot be recovered.
        #[arg(long)]
        cascade: bool,
    },
}

#[derive(Debug, Args)]
pub struct DoctorFields {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub specialization: String,
    #[arg(long)]
    pub license: String,
    #[arg(long)]
    pub phone: String,
    #[arg(long)]
    pub email: String,
    /// M|F|O
    #[arg(long)]
    pub gender: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub dob: Option<String>,
    /// Weekly slot as DAY=HH:MM, e.g. Monday=09:00; repeat for several.
    #[arg(long = "slot")]
    pub slots: Vec<String>,
    #[command(flatten)]
    pub address: AddressFields,
}

#[derive(Debug, Subcommand)]
pub enum AppointmentCommand {
    Schedule {
        #[arg(long)]
        patient: EntityId,
        #[arg(long)]
        doctor: EntityId,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// HH:MM
        #[arg(long)]
        time: String,
        #[arg(long, default_value = "")]
        reason: String,
    },
    List {
        #[arg(long)]
        patient: Option<EntityId>,
        #[arg(long)]
        doctor: Option<EntityId>,
        /// scheduled|completed|cancelled
        #[arg(long)]
        status: Option<String>,
        /// Inclusive start date, YYYY-MM-DD.
        #[arg(long)]
        from: Option<String>,
        /// Inclusive end date, YYYY-MM-DD.
        #[arg(long)]
        to: Option<String>,
    },
    Complete { id: EntityId },
    Cancel { id: EntityId },
}

#[derive(Debug, Subcommand)]
pub enum BillCommand {
    Add {
        #[arg(long)]
        patient: EntityId,
        #[arg(long)]
        appointment: Option<EntityId>,
        #[arg(long)]
        amount: String,
        /// YYYY-MM-DD
        #[arg(long)]
        issued: String,
        /// Repeat for several services.
        #[arg(long = "service")]
        services: Vec<String>,
    },
    List {
        #[arg(long)]
        patient: Option<EntityId>,
        #[arg(long)]
        unpaid: bool,
    },
    Pay {
        id: EntityId,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
    },
    Balance { patient: EntityId },
}

#[derive(Debug, Subcommand)]
pub enum RecordCommand {
    Add {
        #[arg(long)]
        patient: EntityId,
        #[arg(long)]
        doctor: Option<EntityId>,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
        #[arg(long)]
        diagnosis: String,
        #[arg(long)]
        treatment: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
    List {
        #[arg(long)]
        patient: Option<EntityId>,
    },
}
