//! NCERT reference table — the static biology facts that ground every trace.
//! Serialized into the system prompt and shown in the Neuro-Lab sidebar.

use serde::ser::{Serialize, Serializer};

/// Ordered `name -> description` facts. Order is preserved in the prompt and in JSON.
#[derive(Debug, Clone, Copy)]
pub struct Facts(pub &'static [(&'static str, &'static str)]);

impl Facts {
    pub fn iter(&self) -> impl Iterator<Item = &(&'static str, &'static str)> {
        self.0.iter()
    }
}

impl Serialize for Facts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(k, v)| (*k, *v)))
    }
}

/// The NCERT Class 10–12 neural-control reference used as prompt context.
#[derive(Debug, Clone, serde::Serialize)]
pub struct NcertReference {
    pub receptor_types: Facts,
    pub neuron_types: Facts,
    pub signal_pathway_components: &'static [&'static str],
    pub key_brain_regions: Facts,
    pub signal_transmission: Facts,
    pub ncert_chapters: &'static [&'static str],
}

static REFERENCE: NcertReference = NcertReference {
    receptor_types: Facts(&[
        ("nociceptors", "Pain receptors in skin/tissue detecting harmful stimuli"),
        ("thermoreceptors", "Detect temperature changes (hot/cold)"),
        ("photoreceptors", "Rods and cones in retina detecting light"),
        ("mechanoreceptors", "Detect pressure, touch, vibration"),
        ("chemoreceptors", "Detect chemical stimuli (taste, smell)"),
        ("proprioceptors", "Detect body position and movement"),
    ]),
    neuron_types: Facts(&[
        ("sensory_neuron", "Afferent neuron carrying signals from receptor to CNS"),
        ("motor_neuron", "Efferent neuron carrying signals from CNS to effector"),
        ("interneuron", "Relay neuron within CNS connecting sensory and motor neurons"),
    ]),
    signal_pathway_components: &[
        "Receptor/Sense Organ",
        "Sensory (Afferent) Neuron",
        "Spinal Cord / Brain Stem (CNS Relay)",
        "Interneuron / Relay Neuron",
        "Brain Region (Processing Center)",
    ],
    key_brain_regions: Facts(&[
        ("somatosensory_cortex", "Processes touch, pain, temperature (parietal lobe)"),
        ("motor_cortex", "Initiates voluntary movement (frontal lobe)"),
        ("visual_cortex", "Processes visual information (occipital lobe)"),
        ("auditory_cortex", "Processes sound (temporal lobe)"),
        ("cerebellum", "Coordinates balance and fine motor control"),
        ("hypothalamus", "Regulates temperature, hunger, thirst"),
        ("medulla_oblongata", "Controls involuntary functions (breathing, heart rate)"),
    ]),
    signal_transmission: Facts(&[
        ("synapse", "Junction between two neurons; signal crosses via neurotransmitters"),
        ("neurotransmitters", "Chemical messengers (e.g., acetylcholine, dopamine)"),
        ("action_potential", "Electrical impulse traveling along the axon"),
        ("reflex_arc", "Rapid involuntary response pathway bypassing the brain"),
    ]),
    ncert_chapters: &[
        "Class 10 Ch.7: Control and Coordination",
        "Class 11 Ch.21: Neural Control and Coordination",
        "Class 12 Ch.4: Human Neural System (reference)",
    ],
};

/// The static reference table.
pub fn reference() -> &'static NcertReference {
    &REFERENCE
}

/// First line of the serialized context block.
pub const CONTEXT_HEADER: &str = "=== NCERT BIOLOGY REFERENCE DATA ===";

impl NcertReference {
    /// Serialize the reference into an LLM-friendly text block.
    pub fn context_block(&self) -> String {
        let mut lines: Vec<String> = vec![CONTEXT_HEADER.to_string()];

        push_facts(&mut lines, "Receptor Types", &self.receptor_types);
        push_facts(&mut lines, "Neuron Types", &self.neuron_types);

        lines.push("\n## Standard Signal Pathway Components (5-step model):".to_string());
        for (i, component) in self.signal_pathway_components.iter().enumerate() {
            lines.push(format!("  Step {}: {}", i + 1, component));
        }

        push_facts(&mut lines, "Key Brain Regions", &self.key_brain_regions);
        push_facts(&mut lines, "Signal Transmission Concepts", &self.signal_transmission);

        lines.push("\n## NCERT Chapter References:".to_string());
        for chapter in self.ncert_chapters {
            lines.push(format!("  - {}", chapter));
        }

        lines.join("\n")
    }
}

fn push_facts(lines: &mut Vec<String>, heading: &str, facts: &Facts) {
    lines.push(format!("\n## {}:", heading));
    for (name, desc) in facts.iter() {
        lines.push(format!("  - {}: {}", name, desc));
    }
}
