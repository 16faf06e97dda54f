pub mod auth_dto;

pub use auth_dto::{
    AuthUserDto, CreateUserDto, SessionResponseDto, SignInRequestDto, SignOutResponseDto,
    UserRoleDto,
};
