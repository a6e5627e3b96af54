pub mod cover_letter;
