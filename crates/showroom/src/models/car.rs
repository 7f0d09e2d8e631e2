use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A car record as stored in the vector collection's seed data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    pub model: String,
    pub price: String,
    pub seats: String,
    pub doors: String,
    pub fuel: String,
    // older seed files spell this "transmition"
    #[serde(alias = "transmition")]
    pub transmission: String,
    pub body_type: String,
    pub image_url: String,
    pub description: String,
}

impl Car {
    /// The labelled text block indexed as the searchable document.
    pub fn document(&self) -> String {
        format!(
            "Model: {}\nPrice: {}\nSeats: {}\nDoors: {}\nFuel: {}\nTransmission: {}\nBody Type: {}\nImage URL: {}\nDescription: {}",
            self.model,
            self.price,
            self.seats,
            self.doors,
            self.fuel,
            self.transmission,
            self.body_type,
            self.image_url,
            self.description,
        )
    }

    /// The flat metadata mapping stored alongside the document.
    pub fn metadata(&self) -> Value {
        json!({
            "model": self.model,
            "price": self.price,
            "seats": self.seats,
            "doors": self.doors,
            "fuel": self.fuel,
            "transmission": self.transmission,
            "body_type": self.body_type,
            "image_url": self.image_url,
            "description": self.description,
        })
    }
}
