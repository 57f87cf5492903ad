// ui/constants.rs

pub const TITLE: &str = " Narikiri · character roleplay chat ";

pub const SUBTITLE: &str = "Analyze a character from sample text, then talk with them in their own voice";

pub const KEY_HINTS: &str = "Tab: next field  Ctrl+S: analyze  Ctrl+L: load example  Ctrl+D: generation details  PgUp/PgDn: scroll  Esc: dismiss error  Ctrl+Q: quit";

pub const MEMORY_HINTS: &str = " ↑↓ select · Enter edit value · Esc cancel ";

// Sample text loaded with Ctrl+L.
pub const EXAMPLE_SOURCE_TEXT: &str = r#"Captain Mirelle Vance leaned on the rail of the Gull's Wager and squinted at the storm line.

"Reef your topsails, lads, and stop gawping like landlubbers at a fish market! That sky's no worse than my cousin's cooking, and I've survived that twice."

The bosun hesitated. "Captain, the harbor master said no ship leaves port tonight."

"The harbor master," Mirelle said, flicking her braid over her shoulder, "also said my grandmother's compass was worthless. The old girl's never once pointed me wrong. Now, are we sailing, or are we writing poems about the weather?"

Later, alone in her cabin, she opened the logbook her brother had left behind before he vanished off the Ashen Coast. She traced his handwriting with a fingertip. "Seven years, Tomas. I'll find you yet, mark my words."

When the cabin boy brought her tea she grinned at him. "Tea? On a night like this? Bless you, Pip, but fetch the rum, there's a good lad. Tea's for people who expect to live to morning.""#;
