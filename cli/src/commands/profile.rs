use anyhow::{Result, bail};
use std::io::{BufRead, Write};

use medinote_core::MedError;
use medinote_core::models::{Profile, ProfileForm};
use medinote_core::service::MedinoteService;

use super::helpers::prompt_profile_form;

/// Profile fields given on the command line; `None` means "not given".
#[derive(Debug, Default)]
pub(crate) struct ProfileArgs {
    pub name: Option<String>,
    pub age: Option<String>,
    pub gender: Option<String>,
    pub height: Option<String>,
    pub weight: Option<String>,
    pub notes: Option<String>,
}

impl ProfileArgs {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.age.is_none()
            && self.gender.is_none()
            && self.height.is_none()
            && self.weight.is_none()
            && self.notes.is_none()
    }

    /// Overlay the given fields onto `base`.
    fn apply_to(self, base: ProfileForm) -> ProfileForm {
        ProfileForm {
            name: self.name.unwrap_or(base.name),
            age: self.age.unwrap_or(base.age),
            gender: self.gender.unwrap_or(base.gender),
            height: self.height.unwrap_or(base.height),
            weight: self.weight.unwrap_or(base.weight),
            notes: self.notes.unwrap_or(base.notes),
        }
    }
}

/// Prompt on `input` until a valid profile is saved. Fails if input ends first.
pub(crate) fn create_profile_interactive<R: BufRead, W: Write>(
    svc: &MedinoteService,
    input: &mut R,
    output: &mut W,
) -> Result<Profile> {
    writeln!(output, "Welcome to medinote. Enter your details for safer medication tracking.")?;
    loop {
        let Some(form) = prompt_profile_form(input, output)? else {
            bail!("A user profile is required to use medinote");
        };
        match svc.create_profile(&form) {
            Ok(profile) => return Ok(profile),
            Err(e @ MedError::Validation { .. }) => writeln!(output, "Error: {e}")?,
            Err(e) => return Err(e.into()),
        }
    }
}

fn print_profile(profile: &Profile) {
    println!("{}", profile.name);
    println!("  Age:     {}", profile.age);
    println!("  Gender:  {}", profile.gender);
    println!("  Height:  {:.1} cm", profile.height_cm);
    println!("  Weight:  {:.1} kg", profile.weight_kg);
    if !profile.notes.is_empty() {
        println!("  Notes:   {}", profile.notes);
    }
}

pub(crate) fn cmd_profile_show(svc: &MedinoteService, json: bool) -> Result<()> {
    let profile = svc.profile()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    } else {
        print_profile(&profile);
    }
    Ok(())
}

pub(crate) fn cmd_profile_init(svc: &MedinoteService, args: ProfileArgs, json: bool) -> Result<()> {
    if svc.has_profile() {
        bail!("A profile already exists. Use `medinote profile edit` to change it");
    }

    let profile = if args.is_empty() {
        let stdin = std::io::stdin();
        create_profile_interactive(svc, &mut stdin.lock(), &mut std::io::stderr())?
    } else {
        svc.create_profile(&args.apply_to(ProfileForm::default()))?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    } else {
        println!("Saved profile for {}", profile.name);
    }
    Ok(())
}

pub(crate) fn cmd_profile_edit(svc: &MedinoteService, args: ProfileArgs, json: bool) -> Result<()> {
    if args.is_empty() {
        bail!(
            "Nothing to update. Provide at least one of --name, --age, --gender, --height, --weight, or --notes"
        );
    }

    let current = svc.profile()?;
    let profile = svc.update_profile(&args.apply_to(ProfileForm::from(&current)))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    } else {
        println!("Updated profile:");
        print_profile(&profile);
    }
    Ok(())
}
