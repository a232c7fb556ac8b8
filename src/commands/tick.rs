use clap::Args;

use prep_core::Session;

#[derive(Args)]
pub struct TickCommand {
    /// Ingredient to mark as added in every bag that needs it
    pub ingredient: String,
}

impl TickCommand {
    pub fn run(&self, session: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
        let name = self.ingredient.trim();
        if name.is_empty() {
            return Err("Ingredient name cannot be empty".into());
        }

        let ticked = session.tick_off_ingredient(name);
        if ticked == 0 && !session.dishes().iter().any(|d| d.requires(name)) {
            return Err(format!("No dish needs '{}'", name).into());
        }

        println!("Ticked off '{}' in {} bag(s)", name, ticked);
        if session.is_exhausted(name) {
            println!("'{}' is now in every bag that needs it", name);
        }
        Ok(())
    }
}
