pub mod analyze_food_image;
